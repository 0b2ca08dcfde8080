#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Host-side control and telemetry core for the 1-DOF rig.
//!
//! This crate holds everything with algorithmic or concurrency content;
//! the desktop front-end is a thin consumer of it.
//!
//! ## Architecture
//!
//! - **Modeling**: plant constants, equilibrium linearization and the
//!   continuous transfer functions (`model`, `tf`)
//! - **Synthesis**: filtered-PID design, pole assignment, and the exact
//!   discretization shared with the embedded side (`synth`)
//! - **Runtime law**: the recursive difference equation and the host-side
//!   mirror of the embedded filter (`filter`)
//! - **Protocol**: the ASCII line codec, inbound and outbound (`codec`)
//! - **Transport**: background worker over a serial or simulated link,
//!   draining into a FIFO event queue (`transport`, `sim`)
//!
//! ## Units
//!
//! Angles cross the wire in degrees and are converted to radians at the
//! single point where the control error is formed. PWM values are ESC
//! microseconds, hard-clamped to [1000, 2000].

pub mod codec;
pub mod error;
pub mod filter;
pub mod mocks;
pub mod model;
pub mod sim;
pub mod synth;
pub mod tf;
pub mod transport;

pub use codec::{DataFrame, LineBuffer, OutboundCommand, TelemetryEvent, decode_line, encode_command};
pub use error::{CommandError, Result, SynthesisError};
pub use filter::{FilterState, Mirror, PWM_MAX, PWM_MIN};
pub use model::{MechModel, MotorModel, PlantParams, RigModel};
pub use sim::{SimCfg, StepResponseSim};
pub use synth::{DiscreteCoefficients, PidfGains, discretize, pidf_tf, pole_assignment};
pub use tf::TransferFunction;
pub use transport::Transport;
