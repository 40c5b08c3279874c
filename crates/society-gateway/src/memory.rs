//! In-memory implementation of [`IdentityGateway`].
//!
//! Accounts are keyed by lower-cased email and carry an Argon2id hash.
//! Profile documents are keyed by account id. A single backend session
//! is tracked, mirroring a browser-side identity SDK.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use society_core::models::identity::{
    CREATED_AT_KEY, EMAIL_KEY, ROLE_KEY, STATUS_KEY, UID_KEY, UPDATED_AT_KEY,
};
use society_core::{
    Account, GatewayError, GatewayResult, IdentityGateway, ProfileDocument, Role, SignIn,
    UserStatus,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::password::{hash_password, verify_password};
use crate::token::{generate_session_token, hash_session_token};

const OFFLINE: &str = "network request failed";
const INVALID_CREDENTIALS: &str = "invalid credentials";
const USER_NOT_FOUND: &str = "user not found";

#[derive(Debug, Clone)]
struct AccountRecord {
    uid: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct BackendSession {
    uid: String,
    token_hash: String,
}

#[derive(Debug, Default)]
struct State {
    /// Lower-cased email -> account.
    accounts: HashMap<String, AccountRecord>,
    /// Account id -> profile document.
    documents: HashMap<String, ProfileDocument>,
    /// Account ids in creation order, for stable listings.
    order: Vec<String>,
    session: Option<BackendSession>,
    reset_requests: Vec<String>,
    offline: bool,
}

impl State {
    fn account_by_uid(&self, uid: &str) -> Option<&AccountRecord> {
        self.accounts.values().find(|a| a.uid == uid)
    }

    fn ensure_online(&self) -> GatewayResult<()> {
        if self.offline {
            Err(GatewayError::unavailable(OFFLINE))
        } else {
            Ok(())
        }
    }
}

/// In-memory identity gateway.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: RwLock<State>,
    config: GatewayConfig,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            state: RwLock::new(State::default()),
            config,
        }
    }

    /// Simulate loss of connectivity: every call fails with
    /// `Unavailable("network request failed")` while set.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Provision an account and its profile document directly on the
    /// backend, with an explicit role and status.
    pub async fn seed_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
        status: UserStatus,
        mut fields: ProfileDocument,
    ) -> GatewayResult<Account> {
        let account = self.insert_account(email, password).await?;
        fields.insert(ROLE_KEY.into(), Value::from(role.as_str()));
        fields.insert(STATUS_KEY.into(), Value::from(status.as_str()));
        self.store_document(&account, fields).await;
        info!(uid = %account.uid, role = %role, "Seeded account");
        Ok(account)
    }

    /// Password reset requests received so far, oldest first.
    pub async fn reset_requests(&self) -> Vec<String> {
        self.state.read().await.reset_requests.clone()
    }

    /// Hash of the token of the active backend session, if any.
    pub async fn session_token_hash(&self) -> Option<String> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.token_hash.clone())
    }

    /// Remove a profile document while keeping the account, leaving an
    /// account that can sign in but has no profile.
    pub async fn delete_profile_document(&self, uid: &str) -> bool {
        let mut state = self.state.write().await;
        state.order.retain(|id| id != uid);
        state.documents.remove(uid).is_some()
    }

    async fn insert_account(&self, email: &str, password: &str) -> GatewayResult<Account> {
        let key = email.trim().to_lowercase();
        if key.is_empty() {
            return Err(GatewayError::rejected("invalid email"));
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(GatewayError::rejected("weak password"));
        }

        let password_hash = hash_password(password, self.config.pepper.as_deref())?;

        let mut state = self.state.write().await;
        state.ensure_online()?;
        if state.accounts.contains_key(&key) {
            return Err(GatewayError::rejected("email already in use"));
        }

        let record = AccountRecord {
            uid: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            password_hash,
        };
        let account = Account {
            uid: record.uid.clone(),
            email: record.email.clone(),
        };
        state.accounts.insert(key, record);
        Ok(account)
    }

    async fn store_document(&self, account: &Account, mut fields: ProfileDocument) -> ProfileDocument {
        let now = Value::from(Utc::now().to_rfc3339());
        fields.insert(UID_KEY.into(), Value::from(account.uid.clone()));
        fields.insert(EMAIL_KEY.into(), Value::from(account.email.clone()));
        fields.insert(CREATED_AT_KEY.into(), now.clone());
        fields.insert(UPDATED_AT_KEY.into(), now);

        let mut state = self.state.write().await;
        if !state.documents.contains_key(&account.uid) {
            state.order.push(account.uid.clone());
        }
        state.documents.insert(account.uid.clone(), fields.clone());
        fields
    }
}

impl IdentityGateway for MemoryGateway {
    async fn create_account(&self, email: &str, password: &str) -> GatewayResult<Account> {
        self.state.read().await.ensure_online()?;
        let account = self.insert_account(email, password).await?;

        // Creating an account signs it in, as hosted identity SDKs do.
        let token = generate_session_token();
        self.state.write().await.session = Some(BackendSession {
            uid: account.uid.clone(),
            token_hash: hash_session_token(&token),
        });

        info!(uid = %account.uid, "Account created");
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<SignIn> {
        let record = {
            let state = self.state.read().await;
            state.ensure_online()?;
            state
                .accounts
                .get(&email.trim().to_lowercase())
                .cloned()
                .ok_or_else(|| GatewayError::rejected(INVALID_CREDENTIALS))?
        };

        let valid = verify_password(password, &record.password_hash, self.config.pepper.as_deref())?;
        if !valid {
            debug!(uid = %record.uid, "Password mismatch");
            return Err(GatewayError::rejected(INVALID_CREDENTIALS));
        }

        let token = generate_session_token();
        self.state.write().await.session = Some(BackendSession {
            uid: record.uid.clone(),
            token_hash: hash_session_token(&token),
        });

        Ok(SignIn {
            account: Account {
                uid: record.uid,
                email: record.email,
            },
            token,
        })
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        let mut state = self.state.write().await;
        state.ensure_online()?;
        state.session = None;
        Ok(())
    }

    async fn current_account(&self) -> GatewayResult<Option<Account>> {
        let state = self.state.read().await;
        state.ensure_online()?;
        Ok(state
            .session
            .as_ref()
            .and_then(|s| state.account_by_uid(&s.uid))
            .map(|a| Account {
                uid: a.uid.clone(),
                email: a.email.clone(),
            }))
    }

    async fn send_password_reset(&self, email: &str) -> GatewayResult<()> {
        let mut state = self.state.write().await;
        state.ensure_online()?;
        let key = email.trim().to_lowercase();
        if !state.accounts.contains_key(&key) {
            return Err(GatewayError::rejected(USER_NOT_FOUND));
        }
        state.reset_requests.push(key);
        Ok(())
    }

    async fn change_password(&self, current_password: &str, new_password: &str) -> GatewayResult<()> {
        let (key, record) = {
            let state = self.state.read().await;
            state.ensure_online()?;
            let uid = state
                .session
                .as_ref()
                .map(|s| s.uid.clone())
                .ok_or_else(|| GatewayError::rejected("requires recent login"))?;
            state
                .accounts
                .iter()
                .find(|(_, a)| a.uid == uid)
                .map(|(k, a)| (k.clone(), a.clone()))
                .ok_or_else(|| GatewayError::rejected(USER_NOT_FOUND))?
        };

        let pepper = self.config.pepper.as_deref();
        if !verify_password(current_password, &record.password_hash, pepper)? {
            return Err(GatewayError::rejected(INVALID_CREDENTIALS));
        }
        if new_password.chars().count() < self.config.min_password_length {
            return Err(GatewayError::rejected("weak password"));
        }
        let password_hash = hash_password(new_password, pepper)?;

        let mut state = self.state.write().await;
        if let Some(account) = state.accounts.get_mut(&key) {
            account.password_hash = password_hash;
        }
        info!(uid = %record.uid, "Password changed");
        Ok(())
    }

    async fn get_profile_document(&self, uid: &str) -> GatewayResult<Option<ProfileDocument>> {
        let state = self.state.read().await;
        state.ensure_online()?;
        Ok(state.documents.get(uid).cloned())
    }

    async fn create_profile_document(
        &self,
        uid: &str,
        mut fields: ProfileDocument,
    ) -> GatewayResult<ProfileDocument> {
        let account = {
            let state = self.state.read().await;
            state.ensure_online()?;
            let record = state
                .account_by_uid(uid)
                .ok_or_else(|| GatewayError::rejected(USER_NOT_FOUND))?;
            Account {
                uid: record.uid.clone(),
                email: record.email.clone(),
            }
        };

        // Role and status are assigned here, never taken from the client.
        fields.insert(ROLE_KEY.into(), Value::from(self.config.default_role.as_str()));
        fields.insert(STATUS_KEY.into(), Value::from(self.config.default_status.as_str()));

        Ok(self.store_document(&account, fields).await)
    }

    async fn update_profile_document(
        &self,
        uid: &str,
        fields: ProfileDocument,
    ) -> GatewayResult<ProfileDocument> {
        let mut state = self.state.write().await;
        state.ensure_online()?;
        let doc = state
            .documents
            .get_mut(uid)
            .ok_or_else(|| GatewayError::rejected(USER_NOT_FOUND))?;

        for (key, value) in fields {
            if key != UID_KEY && key != CREATED_AT_KEY {
                doc.insert(key, value);
            }
        }
        doc.insert(UPDATED_AT_KEY.into(), Value::from(Utc::now().to_rfc3339()));
        debug!(uid, "Profile document updated");
        Ok(doc.clone())
    }

    async fn list_profile_documents(&self) -> GatewayResult<Vec<(String, ProfileDocument)>> {
        let state = self.state.read().await;
        state.ensure_online()?;
        Ok(state
            .order
            .iter()
            .filter_map(|uid| state.documents.get(uid).map(|doc| (uid.clone(), doc.clone())))
            .collect())
    }
}
