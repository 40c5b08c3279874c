//! Session layer error types.

use society_core::SocietyError;
use thiserror::Error;

/// Theme persistence failures.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("theme serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<ThemeError> for SocietyError {
    fn from(err: ThemeError) -> Self {
        SocietyError::Storage(err.to_string())
    }
}
