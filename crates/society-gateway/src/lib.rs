//! SocietySync Gateway — in-process implementation of the identity
//! gateway contract.
//!
//! This crate provides:
//! - [`MemoryGateway`]: accounts, backend sessions and profile documents
//!   held in memory, with fault injection for offline scenarios
//! - Gateway configuration ([`GatewayConfig`])
//! - Argon2id password hashing and opaque session tokens
//!
//! It stands in for the hosted identity backend in tests and in the
//! demo binary.

mod config;
mod error;
mod memory;
pub mod password;
pub mod token;

pub use config::GatewayConfig;
pub use error::StoreError;
pub use memory::MemoryGateway;
pub use password::{hash_password, verify_password};
