#![no_main]
use heli_core::codec::{LineBuffer, decode_line};
use heli_core::filter::Mirror;
use heli_core::synth::{PidfGains, discretize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary wire bytes through the accumulator and decoder; any
    // panic is a bug. Malformed lines must drop silently.
    let gains = PidfGains {
        kp: 1.0,
        ki: 0.5,
        kd: 0.1,
        n: 10.0,
        ts: 0.022,
    };
    let Ok(coeffs) = discretize(&gains, 1500.0) else {
        return;
    };
    let mut mirror = Mirror::new(coeffs);

    let mut lines = LineBuffer::new();
    lines.push(data);
    lines.push(b"\n");
    while let Some(line) = lines.next_line() {
        let _ = decode_line(&line, &mut mirror);
    }
});
