//! Gateway-internal error types and conversions.

use society_core::GatewayError;

/// Failures of the in-memory backend itself, as opposed to refusals of
/// a request.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("password hash error: {0}")]
    Hash(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        GatewayError::Unavailable(err.to_string())
    }
}
