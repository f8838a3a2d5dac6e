use thiserror::Error;

/// Errors surfaced by the probe engine.
///
/// `Connection` is only ever produced inside a single iteration and folded into a
/// failed `IterationResult`; it never aborts a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("cannot resolve {host}: {reason}")]
    Resolution { host: String, reason: String },
    #[error("connection error: {0}")]
    Connection(String),
    #[error("no data: zero iterations completed")]
    InsufficientData,
}
