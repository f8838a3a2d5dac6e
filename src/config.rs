use std::time::Duration;

use crate::error::ProbeError;

/// Service port used when none is given. No scheme-based inference: TLS is not spoken.
pub const DEFAULT_PORT: u16 = 80;

/// Per-iteration deadline covering connect, send and the full response drain.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Size of the per-iteration read buffer.
pub const READ_BUFFER_SIZE: usize = 2048;

/// Upper bound on hostname length in bytes.
pub const MAX_HOST_LEN: usize = 255;

/// Upper bound on request path length in bytes.
pub const MAX_PATH_LEN: usize = 255;

/// How much the runner echoes while probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only the status code of non-200 responses.
    #[default]
    Brief,
    /// Full response echo plus a line per run.
    Verbose,
}

impl Verbosity {
    pub fn is_verbose(self) -> bool {
        self == Verbosity::Verbose
    }
}

/// Settings for one probing run, built once by the CLI and passed down by reference.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub repeat: u64,
    pub port: u16,
    pub timeout: Duration,
    pub verbosity: Verbosity,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            repeat: 1,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            verbosity: Verbosity::default(),
        }
    }
}

impl ProbeConfig {
    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.repeat == 0 {
            return Err(ProbeError::Configuration(
                "repeat count must be a positive integer".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ProbeError::Configuration("timeout must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_brief() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.port, 80);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.verbosity, Verbosity::Brief);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_repeat_rejected() {
        let cfg = ProbeConfig { repeat: 0, ..ProbeConfig::default() };
        assert!(matches!(cfg.validate(), Err(ProbeError::Configuration(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = ProbeConfig { timeout: Duration::ZERO, ..ProbeConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
