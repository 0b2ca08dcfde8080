//! The discrete recursive control law and the host-side mirror state.

use crate::synth::DiscreteCoefficients;

/// Hard PWM saturation limits of the speed controller [µs].
pub const PWM_MIN: f64 = 1000.0;
pub const PWM_MAX: f64 = 2000.0;

/// Two-sample error and output history of the recursive law.
///
/// Zeroed at construction and whenever the coefficients are replaced. The
/// history rolls with the *unclamped* output: saturation has no anti-windup
/// here, matching the embedded implementation (flagged for review, not
/// silently corrected).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    e_km1: f64,
    e_km2: f64,
    u_km1: f64,
    u_km2: f64,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One step of the difference equation. Returns the saturated PWM; the
    /// state update happens unconditionally, saturation or not.
    pub fn step(&mut self, error: f64, co: &DiscreteCoefficients) -> f64 {
        let u = (co.a0 * error + co.a1 * self.e_km1 + co.a2 * self.e_km2
            - co.a4 * self.u_km1
            - co.a5 * self.u_km2)
            / co.a3;
        let pwm = (u + co.pwm_eq).clamp(PWM_MIN, PWM_MAX);

        self.e_km2 = self.e_km1;
        self.e_km1 = error;
        self.u_km2 = self.u_km1;
        self.u_km1 = u;

        pwm
    }
}

/// The host-side soft copy of the embedded filter: coefficients, history
/// and the current reference, grouped so the transport owns exactly one
/// lockable unit.
#[derive(Debug, Clone)]
pub struct Mirror {
    coeffs: DiscreteCoefficients,
    state: FilterState,
    reference_rad: f64,
}

impl Mirror {
    pub fn new(coeffs: DiscreteCoefficients) -> Self {
        Self {
            coeffs,
            state: FilterState::new(),
            reference_rad: 0.0,
        }
    }

    pub fn coeffs(&self) -> &DiscreteCoefficients {
        &self.coeffs
    }

    pub fn reference_rad(&self) -> f64 {
        self.reference_rad
    }

    /// Swap in a freshly computed coefficient set. History is reset on
    /// every swap; see DESIGN.md for the rationale.
    pub fn set_coeffs(&mut self, coeffs: DiscreteCoefficients) {
        self.coeffs = coeffs;
        self.state.reset();
    }

    pub fn set_reference_deg(&mut self, angle_deg: f64) {
        self.reference_rad = angle_deg.to_radians();
    }

    /// Feed one measured angle through the mirror; returns the PWM the
    /// host-side law would command right now.
    pub fn observe(&mut self, angle_deg: f64) -> f64 {
        let error = self.reference_rad - angle_deg.to_radians();
        self.state.step(error, &self.coeffs)
    }
}
