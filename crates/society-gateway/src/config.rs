//! Gateway configuration.

use society_core::{Role, UserStatus};

/// Configuration for [`MemoryGateway`](crate::MemoryGateway).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length the backend accepts (default: 6).
    pub min_password_length: usize,
    /// Role stamped on self-registered profiles (default: resident).
    pub default_role: Role,
    /// Status stamped on self-registered profiles (default: pending).
    pub default_status: UserStatus,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 6,
            default_role: Role::Resident,
            default_status: UserStatus::Pending,
        }
    }
}
