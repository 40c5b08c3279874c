//! Form inputs accepted by the session store and the user directory.
//!
//! Every form derives [`Validate`]; violations are reported per field
//! through [`crate::validation::check`] before any gateway call is made.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{SocietyError, SocietyResult};
use crate::models::identity::ProfileDocument;
use crate::models::role::{Gender, Role, UserStatus, UserType};
use crate::validation::{
    validate_aadhar_card, validate_agreement, validate_phone_number, validate_pin_number,
};

/// Self-registration input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(length(min = 1, max = 50, message = "First Name must be 1 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last Name must be 1 to 50 characters"))]
    pub last_name: String,
    pub gender: Gender,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(skip_serializing)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(custom(function = "validate_pin_number"))]
    pub pin_number: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Street/Tower is required"))]
    pub street_tower: String,
    #[validate(length(min = 1, message = "Floor Number is required"))]
    pub floor_number: String,
    #[validate(length(min = 1, message = "House Number is required"))]
    pub house_number: String,
    #[validate(custom(function = "validate_aadhar_card"))]
    pub aadhar_card: String,
    #[serde(rename = "propertyID", skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(rename = "PPPID", skip_serializing_if = "Option::is_none")]
    pub ppp_id: Option<String>,
    pub user_type: UserType,
    /// Reference to an uploaded picture (URL or storage path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing)]
    #[validate(custom(function = "validate_agreement"))]
    pub agree_to_terms: bool,
}

impl SignupForm {
    /// Profile document fields for this registration. Password fields and
    /// the agreement flag are never part of the document.
    pub fn to_document(&self) -> SocietyResult<ProfileDocument> {
        to_document(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Partial update of the signed-in user's own profile. Only the fields
/// that are `Some` are sent and validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "First Name must be 1 to 50 characters"))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Last Name must be 1 to 50 characters"))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "State is required"))]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "City is required"))]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_pin_number"))]
    pub pin_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Street/Tower is required"))]
    pub street_tower: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Floor Number is required"))]
    pub floor_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "House Number is required"))]
    pub house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_aadhar_card"))]
    pub aadhar_card: Option<String>,
    #[serde(rename = "propertyID", skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(rename = "PPPID", skip_serializing_if = "Option::is_none")]
    pub ppp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Value>>,
}

impl ProfileUpdate {
    pub fn to_document(&self) -> SocietyResult<ProfileDocument> {
        to_document(self)
    }
}

/// Administrative edit of any directory entry, including role and status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing)]
    #[validate(length(min = 1, message = "User id is required"))]
    pub uid: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfileUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
}

impl UserUpdate {
    pub fn to_document(&self) -> SocietyResult<ProfileDocument> {
        to_document(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords don't match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

fn to_document<T: Serialize>(form: &T) -> SocietyResult<ProfileDocument> {
    match serde_json::to_value(form) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SocietyError::Internal(format!(
            "form serialized to a non-object value: {other}"
        ))),
        Err(e) => Err(SocietyError::Internal(format!("form serialization: {e}"))),
    }
}
