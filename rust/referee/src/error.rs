//! Error types for the referee process.

use std::fmt;

use crate::config::ConfigError;

/// Errors that can abort match orchestration. Faults inside the game loop
/// never surface here; they are logged and compensated in place so a broken
/// player cannot take the match down.
#[derive(Debug)]
pub enum RefereeError {
    /// I/O error while writing logs or records
    Io(std::io::Error),
    /// Configuration could not be loaded or validated
    Config(ConfigError),
}

impl fmt::Display for RefereeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefereeError::Io(e) => write!(f, "I/O error: {}", e),
            RefereeError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for RefereeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefereeError::Io(e) => Some(e),
            RefereeError::Config(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for RefereeError {
    fn from(error: std::io::Error) -> Self {
        RefereeError::Io(error)
    }
}

impl From<ConfigError> for RefereeError {
    fn from(error: ConfigError) -> Self {
        RefereeError::Config(error)
    }
}
