//! Offline telemetry generator: a drop-in substitute for the serial link
//! that manufactures a plausible closed-loop response, so the rest of the
//! stack can be exercised with no rig on the desk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Parameters of the synthetic second-order step response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimCfg {
    /// Natural frequency [rad/s]
    pub wn: f64,
    /// Damping ratio (underdamped: < 1)
    pub zeta: f64,
    pub reference_deg: f64,
    pub initial_deg: f64,
    pub period: Duration,
    /// Fixed RNG seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            wn: 2.0,
            zeta: 0.7,
            reference_deg: 20.0,
            initial_deg: -50.0,
            period: Duration::from_millis(10),
            seed: None,
        }
    }
}

impl From<&heli_config::SimulatorCfg> for SimCfg {
    fn from(cfg: &heli_config::SimulatorCfg) -> Self {
        Self {
            wn: cfg.wn,
            zeta: cfg.zeta,
            reference_deg: cfg.reference_deg,
            initial_deg: cfg.initial_deg,
            period: Duration::from_millis(cfg.period_ms),
            seed: cfg.seed,
        }
    }
}

/// One synthetic telemetry sample, before the mirror attaches its own PWM
/// estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSample {
    pub angle_deg: f64,
    pub error_deg: f64,
    pub pwm: f64,
}

/// Forward-Euler integration of an underdamped second-order response plus
/// bounded uniform perturbations, mimicking what the rig reports over the
/// wire during a step.
#[derive(Debug)]
pub struct StepResponseSim {
    cfg: SimCfg,
    y: f64,
    dy: f64,
    rng: StdRng,
}

impl StepResponseSim {
    pub fn new(cfg: &SimCfg) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cfg: *cfg,
            y: cfg.initial_deg,
            dy: 0.0,
            rng,
        }
    }

    pub fn period(&self) -> Duration {
        self.cfg.period
    }

    pub fn next_sample(&mut self) -> SimSample {
        let dt = self.cfg.period.as_secs_f64();
        let err = self.cfg.reference_deg - self.y;
        let ddy = self.cfg.wn * self.cfg.wn * err - 2.0 * self.cfg.zeta * self.cfg.wn * self.dy;
        self.dy += ddy * dt;
        self.y += self.dy * dt;

        let pwm = (1500.0 + 10.0 * err + self.rng.gen_range(-2.0..=2.0))
            .clamp(crate::filter::PWM_MIN, crate::filter::PWM_MAX);

        SimSample {
            angle_deg: self.y + self.rng.gen_range(-0.5..=0.5),
            error_deg: err + self.rng.gen_range(-0.3..=0.3),
            pwm,
        }
    }
}
