use criterion::{Criterion, black_box, criterion_group, criterion_main};
use heli_core::filter::FilterState;
use heli_core::synth::{PidfGains, discretize};

// Synthetic error trace: decaying oscillation, roughly what a step
// response against a fixed reference looks like.
fn synth_errors(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.022;
            1.2 * (-0.8 * t).exp() * (2.0 * t).cos()
        })
        .collect()
}

pub fn bench_filter_step(c: &mut Criterion) {
    let gains = PidfGains {
        kp: 1.2,
        ki: 0.8,
        kd: 0.05,
        n: 20.0,
        ts: 0.022,
    };
    let co = discretize(&gains, 1500.0).expect("valid gains");
    let errors = synth_errors(1_000);

    c.bench_function("filter_step_1k", |b| {
        b.iter(|| {
            let mut st = FilterState::new();
            let mut acc = 0.0;
            for &e in &errors {
                acc += st.step(black_box(e), &co);
            }
            black_box(acc)
        })
    });

    c.bench_function("discretize", |b| {
        b.iter(|| discretize(black_box(&gains), black_box(1500.0)))
    });
}

criterion_group!(benches, bench_filter_step);
criterion_main!(benches);
