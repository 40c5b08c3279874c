use society_core::SocietyError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Society(#[from] SocietyError),
}

impl From<society_core::GatewayError> for AppError {
    fn from(err: society_core::GatewayError) -> Self {
        Self::Society(err.into())
    }
}
