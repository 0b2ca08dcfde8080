//! Continuous filtered-PID design and its exact discretization.
//!
//! The discretization is a closed-form substitution, not a generic Tustin
//! transform: the embedded controller runs the same algebra, and the host
//! mirror must agree with it to within floating-point rounding. Changing
//! the formulas below breaks that agreement.

use crate::error::{Result, SynthesisError};
use crate::tf::TransferFunction;

/// Continuous filtered-derivative PID parameters plus the sampling period.
/// Owned by the caller and passed in whole on every change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidfGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Derivative filter coefficient; 0 is a forbidden input.
    pub n: f64,
    /// Sampling period [s].
    pub ts: f64,
}

impl From<&heli_config::ControllerCfg> for PidfGains {
    fn from(cfg: &heli_config::ControllerCfg) -> Self {
        Self {
            kp: cfg.kp,
            ki: cfg.ki,
            kd: cfg.kd,
            n: cfg.n,
            ts: cfg.ts,
        }
    }
}

/// The six coefficients of the discrete recursive control law, together
/// with the sampling period and equilibrium PWM they were computed for.
///
/// Always recomputed wholesale; `a3 == 1` by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteCoefficients {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub a4: f64,
    pub a5: f64,
    pub ts: f64,
    pub pwm_eq: f64,
}

/// Continuous controller `C(s) = Kp + Ki/s + Kd·N·s / (s + N)`.
///
/// Expanded over the common denominator `s(s + N)`:
/// num = (Kp + Kd·N)s² + (Kp·N + Ki)s + Ki·N.
pub fn pidf_tf(kp: f64, ki: f64, kd: f64, n: f64) -> Result<TransferFunction> {
    if n == 0.0 {
        return Err(eyre::Report::new(SynthesisError::ZeroDerivativeFilter));
    }
    TransferFunction::new(
        vec![kp + kd * n, kp * n + ki, ki * n],
        vec![1.0, n, 0.0],
    )
}

/// Closed-form second-order design target from settling time and overshoot.
///
/// `zeta = -ln(Mp)/sqrt(pi² + ln²(Mp))`, `wn = 4/(zeta·Tss)`. Returns the
/// target transfer function `wn² / (s² + 2·zeta·wn·s + wn²)` along with
/// `(zeta, wn)`.
pub fn pole_assignment(tss: f64, mp: f64) -> Result<(TransferFunction, f64, f64)> {
    if !mp.is_finite() || mp <= 0.0 || mp >= 1.0 {
        return Err(eyre::Report::new(SynthesisError::OvershootOutOfRange(mp)));
    }
    if !tss.is_finite() || tss <= 0.0 {
        return Err(eyre::Report::new(SynthesisError::SettlingTimeOutOfRange(
            tss,
        )));
    }
    let ln_mp = mp.ln();
    let zeta = -ln_mp / (std::f64::consts::PI.powi(2) + ln_mp * ln_mp).sqrt();
    let wn = 4.0 / (zeta * tss);
    let target = TransferFunction::new(
        vec![wn * wn],
        vec![1.0, 2.0 * zeta * wn, wn * wn],
    )?;
    Ok((target, zeta, wn))
}

/// Convert continuous filtered-PID gains into the discrete recursive law.
///
/// This is the same computation the embedded side performs; it is the only
/// place in the host where the coefficients are derived, so the synthesis
/// path and the telemetry mirror cannot drift apart.
pub fn discretize(gains: &PidfGains, pwm_eq: f64) -> Result<DiscreteCoefficients> {
    if gains.n == 0.0 {
        return Err(eyre::Report::new(SynthesisError::ZeroDerivativeFilter));
    }
    if !gains.ts.is_finite() || gains.ts <= 0.0 {
        return Err(eyre::Report::new(
            SynthesisError::NonPositiveSamplingPeriod(gains.ts),
        ));
    }

    let (kp, ki, kd, n, ts) = (gains.kp, gains.ki, gains.kd, gains.n, gains.ts);
    let a = kp + kd * n;
    let b = kp * n + ki;
    let c = ki * n;
    let d = n;

    let k1 = (b * d - c) / (d * d);
    let k2 = c / d;
    let k3 = (a * d * d - b * d + c) / (d * d);

    let decay = (-d * ts).exp();

    Ok(DiscreteCoefficients {
        a0: k1 + k3,
        a1: -k1 - k1 * decay + k2 * ts - 2.0 * k3,
        a2: k1 * decay - k2 * ts * decay + k3,
        a3: 1.0,
        a4: -decay - 1.0,
        a5: decay,
        ts,
        pwm_eq,
    })
}
