use thiserror::Error;

/// Domain errors for controller synthesis. These must fail loudly: a silent
/// NaN in the coefficient set would corrupt every subsequent control output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("derivative filter coefficient N must not be 0")]
    ZeroDerivativeFilter,
    #[error("sampling period Ts must be > 0, got {0}")]
    NonPositiveSamplingPeriod(f64),
    #[error("overshoot Mp must lie in (0, 1), got {0}")]
    OvershootOutOfRange(f64),
    #[error("settling time Tss must be > 0, got {0}")]
    SettlingTimeOutOfRange(f64),
    #[error("transfer function denominator must have a nonzero leading coefficient")]
    DegenerateDenominator,
}

/// Link-level failures surfaced to the caller of `send_command`; everything
/// the worker hits asynchronously is reported through the event queue
/// instead.
#[derive(Debug, Error, Clone)]
pub enum CommandError {
    #[error("no active link; command dropped")]
    NotConnected,
    #[error("command write timed out")]
    Timeout,
    #[error("command write failed: {0}")]
    Write(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
