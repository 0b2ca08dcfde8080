//! Bidirectional translation between typed events/commands and the rig's
//! ASCII line protocol.
//!
//! Inbound, one line per message:
//! - any line mentioning both "calibr…" and "esc" (case-insensitive, any
//!   order) is the firmware's calibration warning, whatever else it
//!   contains; the stem covers the Spanish "calibre" as well as English
//!   "calibration" phrasings;
//! - `#<angle_deg>,<error_deg>,<pwm_hw>` is a telemetry sample;
//! - everything else is chatter and is ignored.
//!
//! Outbound: `<Tss>,<Mp>,<Kp>,<Ki>,<Kd>,<N>,<pwm>,<toggle>\n`, numeric
//! fields fixed to 4 decimals, unset fields rendered as the literal `nan`,
//! toggle as `0`/`1`.

use crate::filter::Mirror;

/// One telemetry sample: the hardware-reported values plus the host
/// mirror's own PWM estimate for the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataFrame {
    pub angle_deg: f64,
    pub error_deg: f64,
    pub pwm_hw: f64,
    pub pwm_sw: f64,
}

/// Everything the transport can hand to the consumer. Each event is moved
/// once into the queue and once out.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Data(DataFrame),
    Warning(String),
    TransportError(String),
}

/// Gain/reference command pushed to the embedded controller. Fields left
/// as `None` (or holding non-finite values) serialize as `nan`, which the
/// firmware treats as "keep the current value".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutboundCommand {
    pub tss: Option<f64>,
    pub mp: Option<f64>,
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
    pub n: Option<f64>,
    pub pwm: Option<f64>,
    pub toggle: bool,
}

/// Accumulates raw bytes from the wire and yields complete lines. Invalid
/// byte sequences decode lossily to the replacement character; the line may
/// still fail numeric validation later and be dropped there.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next `\n`-terminated line, without the terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.buf.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&raw[..pos]).into_owned())
    }
}

/// Decode one inbound line. Telemetry samples are run through the mirror to
/// attach the host-side PWM estimate; malformed samples are dropped without
/// producing an event.
pub fn decode_line(line: &str, mirror: &mut Mirror) -> Option<TelemetryEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // The calibration warning takes priority over any other shape the line
    // might have.
    let lower = line.to_lowercase();
    if lower.contains("calibr") && lower.contains("esc") {
        return Some(TelemetryEvent::Warning(line.to_string()));
    }

    let body = line.strip_prefix('#')?;
    let mut fields = body.split(',');
    let parsed: Option<(f64, f64, f64)> = (|| {
        let angle = fields.next()?.trim().parse().ok()?;
        let error = fields.next()?.trim().parse().ok()?;
        let pwm = fields.next()?.trim().parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some((angle, error, pwm))
    })();

    let Some((angle_deg, error_deg, pwm_hw)) = parsed else {
        tracing::debug!(line, "dropping malformed telemetry line");
        return None;
    };

    let pwm_sw = mirror.observe(angle_deg);
    Some(TelemetryEvent::Data(DataFrame {
        angle_deg,
        error_deg,
        pwm_hw,
        pwm_sw,
    }))
}

fn render_field(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "nan".to_string(),
    }
}

/// Serialize an outbound command to its wire line, newline included. The
/// caller writes the returned string in one operation.
pub fn encode_command(cmd: &OutboundCommand) -> String {
    format!(
        "{},{},{},{},{},{},{},{}\n",
        render_field(cmd.tss),
        render_field(cmd.mp),
        render_field(cmd.kp),
        render_field(cmd.ki),
        render_field(cmd.kd),
        render_field(cmd.n),
        render_field(cmd.pwm),
        u8::from(cmd.toggle),
    )
}
