#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the rig host console.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `ControllerSnapshot` is the flat JSON document the desktop front-end
//!   saves/loads; the host core only consumes its numerator/denominator
//!   arrays to rebuild a controller for diagnostic display.
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("serial baud rate must be > 0")]
    ZeroBaud,
    #[error("serial read timeout must be >= 1 ms")]
    ZeroReadTimeout,
    #[error("sampling period ts must be > 0")]
    NonPositiveSamplingPeriod,
    #[error("derivative filter coefficient n must not be 0")]
    ZeroDerivativeFilter,
    #[error("simulator period must be >= 1 ms")]
    ZeroSimPeriod,
    #[error("simulator damping ratio must be in (0, 1]")]
    BadSimDamping,
}

/// Serial link parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialCfg {
    pub port: String,
    pub baud: u32,
    /// Per-read timeout; also bounds how long `stop()` can block on the
    /// worker's in-flight read.
    pub read_timeout_ms: u64,
    /// Idle back-off between polls when no bytes are pending.
    pub poll_ms: u64,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud: 9600,
            read_timeout_ms: 100,
            poll_ms: 1,
        }
    }
}

/// Measured physical constants of the rig. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlantCfg {
    /// Arm inertia about the pivot [kg·m²]
    pub inertia: f64,
    /// Gravity torque coefficient [N·m]
    pub torque_coeff: f64,
    /// Moment arm of the thrust force [m]
    pub moment_arm: f64,
    /// Thrust-vs-PWM slope [N per µs]
    pub pwm_slope: f64,
    /// Thrust-vs-PWM intercept [N]
    pub pwm_intercept: f64,
}

impl Default for PlantCfg {
    fn default() -> Self {
        Self {
            inertia: 0.0167,
            torque_coeff: -0.1326,
            moment_arm: 0.3310,
            pwm_slope: 0.001586,
            pwm_intercept: -1.692631,
        }
    }
}

/// Filtered-PID parameters applied at startup.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ControllerCfg {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Derivative filter coefficient; must never be 0.
    pub n: f64,
    /// Sampling period [s], matching the embedded loop.
    pub ts: f64,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            n: 1.0,
            ts: 0.022,
        }
    }
}

/// Offline telemetry generator parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimulatorCfg {
    /// Natural frequency of the synthetic response [rad/s]
    pub wn: f64,
    /// Damping ratio (underdamped: < 1)
    pub zeta: f64,
    pub reference_deg: f64,
    pub initial_deg: f64,
    pub period_ms: u64,
    /// Fixed RNG seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
}

impl Default for SimulatorCfg {
    fn default() -> Self {
        Self {
            wn: 2.0,
            zeta: 0.7,
            reference_deg: 20.0,
            initial_deg: -50.0,
            period_ms: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialCfg,
    pub plant: PlantCfg,
    pub controller: ControllerCfg,
    pub simulator: SimulatorCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        let cfg = load_toml(&text).wrap_err("parsing config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroReadTimeout);
        }
        if self.controller.ts.is_nan() || self.controller.ts <= 0.0 {
            return Err(ConfigError::NonPositiveSamplingPeriod);
        }
        if self.controller.n == 0.0 {
            return Err(ConfigError::ZeroDerivativeFilter);
        }
        if self.simulator.period_ms == 0 {
            return Err(ConfigError::ZeroSimPeriod);
        }
        if self.simulator.zeta.is_nan() || self.simulator.zeta <= 0.0 || self.simulator.zeta > 1.0 {
            return Err(ConfigError::BadSimDamping);
        }
        Ok(())
    }
}

/// Flat JSON document persisted by the desktop front-end: selected model
/// names plus the current controller's transfer-function coefficients in
/// descending powers of s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerSnapshot {
    pub motor: String,
    pub mech: String,
    pub ctrl: String,
    #[serde(rename = "C_num")]
    pub c_num: Vec<f64>,
    #[serde(rename = "C_den")]
    pub c_den: Vec<f64>,
}

impl ControllerSnapshot {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = load_toml("").expect("empty config parses");
        assert_eq!(cfg.serial.baud, 9600);
        assert_eq!(cfg.controller.ts, 0.022);
        assert_eq!(cfg.simulator.reference_deg, 20.0);
        cfg.validate().expect("defaults validate");
    }

    #[test]
    fn snapshot_round_trips() {
        let snap = ControllerSnapshot {
            motor: "static gain".into(),
            mech: "frictionless".into(),
            ctrl: "pidf".into(),
            c_num: vec![1.5, 2.0, 0.25],
            c_den: vec![1.0, 10.0, 0.0],
        };
        let json = snap.to_json().unwrap();
        let back = ControllerSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snap);
    }
}
