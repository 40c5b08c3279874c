//! Identity domain model: the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::role::{Role, UserStatus};

/// Profile document as stored by the gateway: a flat JSON object with
/// camelCase keys.
pub type ProfileDocument = serde_json::Map<String, Value>;

/// Document keys the core interprets itself. Everything else is kept
/// in [`Identity::profile`] untouched.
pub const UID_KEY: &str = "uid";
pub const EMAIL_KEY: &str = "email";
pub const ROLE_KEY: &str = "role";
pub const STATUS_KEY: &str = "status";
pub const CREATED_AT_KEY: &str = "createdAt";
pub const UPDATED_AT_KEY: &str = "updatedAt";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: String,
    /// `None` when the backend holds no role or one this build does not
    /// recognise. Such identities match no role-restricted route.
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// Address fields, phone, documents, ... (opaque to the core).
    pub profile: ProfileDocument,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Build an identity from auth-provided `uid`/`email` and the
    /// profile document fields.
    ///
    /// The auth-provided `uid` always wins; a document `email` overrides
    /// the auth-provided one only when it is a non-empty string.
    pub fn from_document(uid: impl Into<String>, email: impl Into<String>, doc: ProfileDocument) -> Self {
        let mut identity = Identity {
            uid: uid.into(),
            email: email.into(),
            role: None,
            status: None,
            profile: ProfileDocument::new(),
            created_at: None,
            updated_at: None,
        };
        identity.merge(&doc);
        identity
    }

    /// Merge (partial) document fields into this identity.
    ///
    /// `uid` is never replaced. `role`, `status` and the timestamps change
    /// only when their keys are present.
    pub fn merge(&mut self, doc: &ProfileDocument) {
        for (key, value) in doc {
            match key.as_str() {
                UID_KEY => {}
                EMAIL_KEY => {
                    if let Some(email) = value.as_str().filter(|e| !e.is_empty()) {
                        self.email = email.to_string();
                    }
                }
                ROLE_KEY => self.role = value.as_str().and_then(Role::parse),
                STATUS_KEY => self.status = value.as_str().and_then(UserStatus::parse),
                CREATED_AT_KEY => self.created_at = parse_timestamp(value),
                UPDATED_AT_KEY => self.updated_at = parse_timestamp(value),
                _ => {
                    self.profile.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Profile attribute as a string, if present and textual.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.profile.get(name).and_then(Value::as_str)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.field("firstName")
    }

    pub fn last_name(&self) -> Option<&str> {
        self.field("lastName")
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.field("phoneNumber")
    }

    /// "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        let name = [self.first_name(), self.last_name()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
