//! User directory cache for administrative listing and editing.
//!
//! Independent of the session identity: entries are only populated by
//! explicit fetches, admin edits, and the session store's upsert of the
//! signed-in user after login or registration.

use std::sync::Arc;

use serde_json::Value;
use society_core::validation::check;
use society_core::{
    Identity, IdentityGateway, ProfileDocument, Role, SocietyError, SocietyResult, UserStatus,
    UserUpdate,
};
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryState {
    /// Entries in fetch/insertion order, unique by uid.
    pub users: Vec<Identity>,
    pub selected: Option<Identity>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Listing filter. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// Case-insensitive match against name, email and phone number.
    pub search: Option<String>,
}

impl DirectoryFilter {
    fn matches(&self, user: &Identity) -> bool {
        if self.role.is_some_and(|role| user.role != Some(role)) {
            return false;
        }
        if self.status.is_some_and(|status| user.status != Some(status)) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(user.display_name()),
                    Some(user.email.clone()),
                    user.phone_number().map(str::to_string),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    pub total: usize,
    pub active: usize,
    pub admins: usize,
    pub residents: usize,
    pub security: usize,
}

pub struct UserDirectory<G: IdentityGateway> {
    gateway: Arc<G>,
    state: watch::Sender<DirectoryState>,
}

impl<G: IdentityGateway> UserDirectory<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(DirectoryState::default());
        Self { gateway, state }
    }

    pub fn state(&self) -> DirectoryState {
        self.state.borrow().clone()
    }

    pub fn users(&self) -> Vec<Identity> {
        self.state.borrow().users.clone()
    }

    pub fn get(&self, uid: &str) -> Option<Identity> {
        self.state.borrow().users.iter().find(|u| u.uid == uid).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.state.subscribe()
    }

    /// Replace the cache with every profile the backend holds.
    pub async fn fetch_all(&self) -> SocietyResult<Vec<Identity>> {
        self.begin();
        match self.gateway.list_profile_documents().await {
            Ok(documents) => {
                let users: Vec<Identity> = documents
                    .into_iter()
                    .map(|(uid, doc)| {
                        let email = document_email(&doc);
                        Identity::from_document(uid, email, doc)
                    })
                    .collect();
                info!(count = users.len(), "Directory refreshed");
                self.state.send_modify(|s| {
                    s.users = users.clone();
                    s.loading = false;
                    s.error = None;
                });
                Ok(users)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Fetch a single profile, cache it and make it the selection.
    pub async fn fetch_one(&self, uid: &str) -> SocietyResult<Identity> {
        self.begin();
        match self.gateway.get_profile_document(uid).await {
            Ok(Some(doc)) => {
                let email = document_email(&doc);
                let user = Identity::from_document(uid, email, doc);
                self.state.send_modify(|s| {
                    upsert_into(&mut s.users, user.clone());
                    s.selected = Some(user.clone());
                    s.loading = false;
                    s.error = None;
                });
                Ok(user)
            }
            Ok(None) => {
                let err = SocietyError::NotFound {
                    entity: "user".into(),
                    id: uid.to_string(),
                };
                self.fail(err.to_string());
                Err(err)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Insert or replace an entry by uid, refreshing the selection when it
    /// is the same user.
    pub fn upsert(&self, user: Identity) {
        debug!(uid = %user.uid, "Directory upsert");
        self.state.send_if_modified(|s| {
            let before = s.clone();
            if s.selected.as_ref().is_some_and(|sel| sel.uid == user.uid) {
                s.selected = Some(user.clone());
            }
            upsert_into(&mut s.users, user);
            *s != before
        });
    }

    /// Administrative edit; may change role and status.
    pub async fn update_user(&self, update: UserUpdate) -> SocietyResult<Identity> {
        check(&update)?;
        let fields = update.to_document()?;
        self.apply(&update.uid, fields).await
    }

    /// Approve or reject a registration (or deactivate an account).
    pub async fn set_status(
        &self,
        uid: &str,
        status: UserStatus,
        rejection_reason: Option<String>,
    ) -> SocietyResult<Identity> {
        let mut fields = ProfileDocument::new();
        fields.insert("status".into(), Value::from(status.as_str()));
        if status == UserStatus::Rejected {
            fields.insert(
                "rejectionReason".into(),
                rejection_reason.map(Value::from).unwrap_or(Value::Null),
            );
        }
        let user = self.apply(uid, fields).await?;
        info!(uid, status = %status, "User status changed");
        Ok(user)
    }

    pub fn select(&self, uid: &str) -> Option<Identity> {
        let user = self.get(uid);
        self.state.send_modify(|s| s.selected = user.clone());
        user
    }

    pub fn clear_selection(&self) {
        self.state.send_if_modified(|s| s.selected.take().is_some());
    }

    pub fn filter(&self, filter: &DirectoryFilter) -> Vec<Identity> {
        self.state
            .borrow()
            .users
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> DirectoryStats {
        let state = self.state.borrow();
        let count_role = |role: Role| state.users.iter().filter(|u| u.role == Some(role)).count();
        DirectoryStats {
            total: state.users.len(),
            active: state
                .users
                .iter()
                .filter(|u| u.status == Some(UserStatus::Active))
                .count(),
            admins: count_role(Role::Admin),
            residents: count_role(Role::Resident),
            security: count_role(Role::Security),
        }
    }

    async fn apply(&self, uid: &str, fields: ProfileDocument) -> SocietyResult<Identity> {
        self.begin();
        match self.gateway.update_profile_document(uid, fields).await {
            Ok(doc) => {
                let email = document_email(&doc);
                let user = Identity::from_document(uid, email, doc);
                self.state.send_modify(|s| {
                    if s.selected.as_ref().is_some_and(|sel| sel.uid == user.uid) {
                        s.selected = Some(user.clone());
                    }
                    upsert_into(&mut s.users, user.clone());
                    s.loading = false;
                    s.error = None;
                });
                Ok(user)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn fail(&self, reason: String) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(reason);
        });
    }
}

fn upsert_into(users: &mut Vec<Identity>, user: Identity) {
    match users.iter_mut().find(|u| u.uid == user.uid) {
        Some(existing) => *existing = user,
        None => users.push(user),
    }
}

fn document_email(doc: &ProfileDocument) -> String {
    doc.get("email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
