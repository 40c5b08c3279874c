//! Role and account status of a society member.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role assigned by the backend at registration or approval time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Resident,
    Security,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Resident, Role::Security];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Resident => "resident",
            Role::Security => "security",
        }
    }

    /// Lenient parse used for backend documents: unknown values yield
    /// `None` instead of an error.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "resident" => Some(Role::Resident),
            "security" => Some(Role::Security),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
    Inactive,
    Rejected,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<UserStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(UserStatus::Pending),
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "rejected" => Some(UserStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Relationship of a resident to the property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Owner,
    Tenant,
    Maintenance,
}
