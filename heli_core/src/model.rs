//! Analytical model of the 1-DOF rig: physical constants, the equilibrium
//! operating point, and the linearized continuous transfer functions.

use crate::tf::TransferFunction;

/// Measured physical constants. Immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParams {
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

impl Default for PlantParams {
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

impl From<&heli_config::PlantCfg> for PlantParams {
    fn from(cfg: &heli_config::PlantCfg) -> Self {
        Self {
            inertia: cfg.inertia,
            torque_coeff: cfg.torque_coeff,
            moment_arm: cfg.moment_arm,
            pwm_slope: cfg.pwm_slope,
            pwm_intercept: cfg.pwm_intercept,
        }
    }
}

/// Closed set of motor models. Adding a variant forces every accessor to
/// handle it, which is the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorModel {
    /// Static thrust-vs-PWM gain fitted on the bench.
    #[default]
    StaticGain,
}

/// Closed set of mechanical models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MechModel {
    /// Rigid arm, no friction term.
    #[default]
    Frictionless,
}

/// The rig model: constants plus the current linearization point.
///
/// Every equilibrium-angle change atomically recomputes the derived
/// mechanical coefficients and the equilibrium PWM; the last linearization
/// stays available for inspection.
#[derive(Debug, Clone)]
pub struct RigModel {
    params: PlantParams,
    theta_eq_rad: f64,
    mech_a: f64,
    mech_b: f64,
    pwm_eq: f64,
}

impl RigModel {
    pub fn new(params: PlantParams) -> Self {
        let mut model = Self {
            params,
            theta_eq_rad: 0.0,
            mech_a: 0.0,
            mech_b: 0.0,
            pwm_eq: 0.0,
        };
        model.relinearize();
        model
    }

    pub fn params(&self) -> &PlantParams {
        &self.params
    }

    pub fn theta_eq_rad(&self) -> f64 {
        self.theta_eq_rad
    }

    /// Last computed `(A, B)` of the mechanical model `A / (s² + B)`.
    pub fn linearization(&self) -> (f64, f64) {
        (self.mech_a, self.mech_b)
    }

    /// PWM that holds the arm at the equilibrium angle.
    pub fn pwm_eq(&self) -> f64 {
        self.pwm_eq
    }

    /// Move the linearization point. `A`, `B` and `pwm_eq` are never
    /// observable in a half-updated state.
    pub fn set_equilibrium_angle_deg(&mut self, angle_deg: f64) {
        self.theta_eq_rad = angle_deg.to_radians();
        self.relinearize();
    }

    fn relinearize(&mut self) {
        let p = &self.params;
        self.mech_a = p.moment_arm / p.inertia;
        self.mech_b = p.torque_coeff * self.theta_eq_rad.sin() / p.inertia;
        let hold_force = -(p.torque_coeff * self.theta_eq_rad.cos()) / p.moment_arm;
        self.pwm_eq = (hold_force - p.pwm_intercept) / p.pwm_slope;
    }

    /// Static motor transfer function.
    pub fn motor_tf(&self, model: MotorModel) -> TransferFunction {
        match model {
            MotorModel::StaticGain => TransferFunction::constant(self.params.pwm_slope),
        }
    }

    /// Linearized mechanical transfer function `A / (s² + B)` at the
    /// current equilibrium.
    pub fn mechanical_tf(&self, model: MechModel) -> TransferFunction {
        match model {
            MechModel::Frictionless => {
                // den is monic by construction, so new() cannot fail
                TransferFunction::new(vec![self.mech_a], vec![1.0, 0.0, self.mech_b])
                    .unwrap_or_else(|_| TransferFunction::constant(0.0))
            }
        }
    }

    /// Full plant: motor and mechanics in series.
    pub fn plant_tf(&self) -> TransferFunction {
        self.motor_tf(MotorModel::StaticGain)
            .series(&self.mechanical_tf(MechModel::Frictionless))
    }
}

impl Default for RigModel {
    fn default() -> Self {
        Self::new(PlantParams::default())
    }
}
