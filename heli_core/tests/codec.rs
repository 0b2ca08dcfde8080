//! Wire grammar coverage for the line codec, inbound and outbound.

use heli_core::codec::{OutboundCommand, TelemetryEvent, decode_line, encode_command};
use heli_core::filter::Mirror;
use heli_core::synth::{PidfGains, discretize};
use rstest::rstest;

/// Mirror with zero gains: its output sits at pwm_eq for any input, which
/// makes pwm_sw assertions exact.
fn idle_mirror(pwm_eq: f64) -> Mirror {
    let gains = PidfGains {
        kp: 0.0,
        ki: 0.0,
        kd: 0.0,
        n: 1.0,
        ts: 0.022,
    };
    Mirror::new(discretize(&gains, pwm_eq).unwrap())
}

#[test]
fn well_formed_sample_decodes_to_a_data_frame() {
    let mut mirror = idle_mirror(1500.0);
    let event = decode_line("#1.0,2.0,1500.0", &mut mirror).expect("must decode");
    match event {
        TelemetryEvent::Data(f) => {
            assert_eq!(f.angle_deg, 1.0);
            assert_eq!(f.error_deg, 2.0);
            assert_eq!(f.pwm_hw, 1500.0);
            assert_eq!(f.pwm_sw, 1500.0); // zero-gain mirror holds pwm_eq
        }
        other => panic!("expected data frame, got {other:?}"),
    }
}

#[rstest]
#[case("#1.0,2.0")] // too few fields
#[case("#1.0,2.0,3.0,4.0")] // too many fields
#[case("#1.0,two,3.0")] // non-numeric field
#[case("#")] // empty body
#[case("1.0,2.0,1500.0")] // missing marker
#[case("ready")] // chatter
#[case("")] // blank
fn malformed_or_foreign_lines_produce_no_event(#[case] line: &str) {
    let mut mirror = idle_mirror(1500.0);
    assert_eq!(decode_line(line, &mut mirror), None);
}

#[rstest]
#[case("Calibre el ESC antes de intentar usar el motor.")]
#[case("Por favor calibre el ESC")]
#[case("ESC calibration needed")]
#[case("esc CALIBRE")] // order-independent, case-insensitive
fn calibration_chatter_becomes_a_warning(#[case] line: &str) {
    let mut mirror = idle_mirror(1500.0);
    match decode_line(line, &mut mirror) {
        Some(TelemetryEvent::Warning(text)) => assert_eq!(text, line.trim()),
        other => panic!("expected warning for {line:?}, got {other:?}"),
    }
}

#[test]
fn warning_check_outranks_the_data_marker() {
    // A line that would otherwise parse as a frame still warns.
    let mut mirror = idle_mirror(1500.0);
    let event = decode_line("#calibre,el,esc", &mut mirror);
    assert!(matches!(event, Some(TelemetryEvent::Warning(_))));
}

#[test]
fn surrounding_whitespace_is_stripped_before_parsing() {
    let mut mirror = idle_mirror(1500.0);
    let event = decode_line("  #1.0,2.0,1500.0\r", &mut mirror);
    assert!(matches!(event, Some(TelemetryEvent::Data(_))));
}

#[test]
fn command_encoding_matches_the_wire_format_exactly() {
    let cmd = OutboundCommand {
        tss: Some(2.0),
        mp: Some(0.2),
        kp: Some(1.0),
        ki: Some(0.0),
        kd: Some(0.0),
        n: Some(10.0),
        pwm: Some(f64::NAN),
        toggle: true,
    };
    assert_eq!(
        encode_command(&cmd),
        "2.0000,0.2000,1.0000,0.0000,0.0000,10.0000,nan,1\n"
    );
}

#[test]
fn unset_fields_render_as_nan() {
    let cmd = OutboundCommand {
        kp: Some(1.5),
        ..OutboundCommand::default()
    };
    assert_eq!(encode_command(&cmd), "nan,nan,1.5000,nan,nan,nan,nan,0\n");
}

#[test]
fn data_frames_advance_the_mirror_history() {
    // With integral action and a fixed reference, two identical angle
    // readings must yield different outputs: the integrator ramps only if
    // the mirror is actually stepped per frame.
    let gains = PidfGains {
        kp: 50.0,
        ki: 10.0,
        kd: 0.0,
        n: 1.0,
        ts: 0.022,
    };
    let mut mirror = Mirror::new(discretize(&gains, 1500.0).unwrap());
    mirror.set_reference_deg(20.0);

    let first = decode_line("#-50.0,70.0,1000.0", &mut mirror).unwrap();
    let second = decode_line("#-50.0,70.0,1000.0", &mut mirror).unwrap();
    let (TelemetryEvent::Data(a), TelemetryEvent::Data(b)) = (first, second) else {
        panic!("expected data frames");
    };
    assert_ne!(a.pwm_sw, b.pwm_sw);
}
