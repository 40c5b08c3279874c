//! Domain models for SocietySync.
//!
//! These are the core types shared across all crates.

pub mod forms;
pub mod identity;
pub mod role;
