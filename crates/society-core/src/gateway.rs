//! Identity gateway contract.
//!
//! The gateway is the remote identity and document backend. All
//! operations are async and report expected refusals as
//! [`GatewayError::Rejected`](crate::error::GatewayError::Rejected);
//! transport faults come back as `Unavailable`.

use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::models::identity::ProfileDocument;

/// Provider-side account as known to the identity backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Provider-issued account identifier.
    pub uid: String,
    pub email: String,
}

/// Successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub account: Account,
    /// Opaque session token issued by the provider.
    pub token: String,
}

pub trait IdentityGateway: Send + Sync {
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = GatewayResult<Account>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = GatewayResult<SignIn>> + Send;

    fn sign_out(&self) -> impl Future<Output = GatewayResult<()>> + Send;

    /// The account of the backend session that is still active, if any.
    fn current_account(&self) -> impl Future<Output = GatewayResult<Option<Account>>> + Send;

    fn send_password_reset(&self, email: &str) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Change the password of the currently signed-in account. The backend
    /// re-authenticates with `current_password` first.
    fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// `Ok(None)` when no profile document exists for `uid`.
    fn get_profile_document(
        &self,
        uid: &str,
    ) -> impl Future<Output = GatewayResult<Option<ProfileDocument>>> + Send;

    /// Store the profile document for a freshly created account and return
    /// the fields as stored (the backend adds role, status and timestamps).
    fn create_profile_document(
        &self,
        uid: &str,
        fields: ProfileDocument,
    ) -> impl Future<Output = GatewayResult<ProfileDocument>> + Send;

    /// Merge `fields` into the stored document and return the updated
    /// document.
    fn update_profile_document(
        &self,
        uid: &str,
        fields: ProfileDocument,
    ) -> impl Future<Output = GatewayResult<ProfileDocument>> + Send;

    /// Every stored profile document with its account id.
    fn list_profile_documents(
        &self,
    ) -> impl Future<Output = GatewayResult<Vec<(String, ProfileDocument)>>> + Send;
}
