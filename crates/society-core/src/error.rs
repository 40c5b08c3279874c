//! Error types for SocietySync.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Failure reported by the identity gateway.
///
/// Both variants display the backend's reason verbatim so it can be
/// surfaced to the user unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend understood the request and refused it (bad
    /// credentials, duplicate account, stale re-authentication, ...).
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or failed unexpectedly.
    #[error("{0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Per-field validation messages, keyed by the form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SocietyError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("profile not found")]
    ProfileNotFound { uid: String },

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for SocietyError {
    fn from(errors: FieldErrors) -> Self {
        SocietyError::Validation(errors)
    }
}

pub type SocietyResult<T> = Result<T, SocietyError>;
