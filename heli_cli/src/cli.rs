use clap::Parser;
use std::path::PathBuf;

/// Host console for the 1-DOF rig: telemetry drain, gain pushes, and
/// controller diagnostics over a serial or simulated link.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Run against the built-in telemetry simulator instead of a serial port
    #[arg(long)]
    pub simulate: bool,

    /// Serial device path (overrides the config file)
    #[arg(long)]
    pub port: Option<String>,

    /// Serial baud rate (overrides the config file)
    #[arg(long)]
    pub baud: Option<u32>,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reference angle [deg]
    #[arg(long, default_value_t = 0.0)]
    pub reference: f64,

    /// Equilibrium angle used for linearization [deg]
    #[arg(long, default_value_t = 0.0)]
    pub equilibrium: f64,

    /// Proportional gain (overrides the config file)
    #[arg(long)]
    pub kp: Option<f64>,

    /// Integral gain
    #[arg(long)]
    pub ki: Option<f64>,

    /// Derivative gain
    #[arg(long)]
    pub kd: Option<f64>,

    /// Derivative filter coefficient (must not be 0)
    #[arg(long)]
    pub n: Option<f64>,

    /// Sampling period [s]
    #[arg(long)]
    pub ts: Option<f64>,

    /// Settling time [s] for a pole-assignment report (with --mp)
    #[arg(long, requires = "mp")]
    pub tss: Option<f64>,

    /// Peak overshoot in (0,1) for a pole-assignment report (with --tss)
    #[arg(long, requires = "tss")]
    pub mp: Option<f64>,

    /// Print poles/zeros of a saved controller snapshot (JSON) and exit
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Stop after this many milliseconds; run until ctrl-c when absent
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Telemetry drain cadence [ms]
    #[arg(long, default_value_t = 50)]
    pub drain_ms: u64,

    /// Fixed RNG seed for --simulate
    #[arg(long)]
    pub seed: Option<u64>,
}
