//! Session store — register, login, logout and profile orchestration.
//!
//! The store is the only writer of the session snapshot. Each operation
//! dispatches `Pending`, awaits the gateway, then dispatches one
//! resolving action. Concurrent operations are not serialised: whichever
//! resolves last determines the snapshot.

use std::sync::Arc;

use society_core::validation::check;
use society_core::{
    ChangePasswordForm, Identity, IdentityGateway, LoginCredentials, PasswordResetRequest,
    ProfileDocument, ProfileUpdate, SignupForm, SocietyError, SocietyResult,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::directory::UserDirectory;
use crate::notification::NotificationCenter;
use crate::state::{SessionAction, SessionState, reduce};

/// Session store.
///
/// Generic over the gateway implementation so that the session layer has
/// no dependency on a concrete backend.
pub struct SessionStore<G: IdentityGateway> {
    gateway: Arc<G>,
    directory: Arc<UserDirectory<G>>,
    notifications: NotificationCenter,
    state: watch::Sender<SessionState>,
}

impl<G: IdentityGateway> SessionStore<G> {
    pub fn new(
        gateway: Arc<G>,
        directory: Arc<UserDirectory<G>>,
        notifications: NotificationCenter,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            gateway,
            directory,
            notifications,
            state,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn directory(&self) -> &Arc<UserDirectory<G>> {
        &self.directory
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Apply an action through the reducer and publish the result in one
    /// step. Returns whether the snapshot changed.
    pub fn dispatch(&self, action: SessionAction) -> bool {
        self.state.send_if_modified(|state| {
            let next = reduce(state, &action);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    /// Create an account and its profile document, then sign in as it.
    pub async fn register(&self, form: SignupForm) -> SocietyResult<Identity> {
        check(&form)?;
        let fields = form.to_document()?;

        self.dispatch(SessionAction::Pending);
        debug!(email = %form.email, "Registering");

        let result = self.create_identity(&form, fields).await;

        match result {
            Ok(identity) => {
                info!(uid = %identity.uid, "Registration succeeded");
                self.directory.upsert(identity.clone());
                self.dispatch(SessionAction::Authenticated(identity.clone()));
                self.notifications.success(
                    "Registration successful",
                    Some(format!("Welcome, {}", identity.display_name())),
                );
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.reject(&e, "Registration failed");
                Err(e)
            }
        }
    }

    /// Sign in and load the profile document for the account.
    pub async fn login(&self, credentials: LoginCredentials) -> SocietyResult<Identity> {
        check(&credentials)?;

        self.dispatch(SessionAction::Pending);
        debug!(email = %credentials.email, "Logging in");

        let result = self.sign_in_identity(&credentials).await;

        match result {
            Ok(identity) => {
                info!(uid = %identity.uid, role = ?identity.role, "Login succeeded");
                self.directory.upsert(identity.clone());
                self.dispatch(SessionAction::Authenticated(identity.clone()));
                self.notifications.success(
                    "Login successful",
                    Some(format!("Welcome back, {}", identity.display_name())),
                );
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.reject(&e, "Login failed");
                Err(e)
            }
        }
    }

    /// Sign out. Local state is cleared even when the backend cannot be
    /// reached.
    pub async fn logout(&self) {
        let uid = self.state.borrow().identity.as_ref().map(|i| i.uid.clone());
        if let Err(e) = self.gateway.sign_out().await {
            warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
        }
        self.dispatch(SessionAction::LoggedOut);
        info!(uid = ?uid, "Logged out");
        self.notifications
            .success("Logged out", Some("You have been signed out".into()));
    }

    /// Update the signed-in user's own profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> SocietyResult<Identity> {
        let uid = self
            .state
            .borrow()
            .identity
            .as_ref()
            .map(|i| i.uid.clone())
            .ok_or(SocietyError::NotAuthenticated)?;
        check(&update)?;
        let fields = update.to_document()?;

        self.dispatch(SessionAction::Pending);

        match self.gateway.update_profile_document(&uid, fields).await {
            Ok(returned) => {
                self.dispatch(SessionAction::ProfileUpdated(returned));
                let identity = self
                    .state
                    .borrow()
                    .identity
                    .clone()
                    .ok_or(SocietyError::NotAuthenticated)?;
                self.directory.upsert(identity.clone());
                info!(uid = %uid, "Profile updated");
                self.notifications.success("Profile updated", None);
                Ok(identity)
            }
            Err(e) => {
                let e = SocietyError::from(e);
                warn!(uid = %uid, error = %e, "Profile update failed");
                self.fail(&e, "Profile update failed");
                Err(e)
            }
        }
    }

    /// Ask the backend to email a password reset link.
    pub async fn send_password_reset(&self, request: PasswordResetRequest) -> SocietyResult<()> {
        check(&request)?;

        self.dispatch(SessionAction::Pending);
        match self.gateway.send_password_reset(&request.email).await {
            Ok(()) => {
                self.dispatch(SessionAction::Settled);
                self.notifications.success(
                    "Password reset email sent",
                    Some(format!("Check {} for a reset link", request.email)),
                );
                Ok(())
            }
            Err(e) => {
                let e = SocietyError::from(e);
                self.fail(&e, "Password reset failed");
                Err(e)
            }
        }
    }

    /// Change the signed-in user's password.
    pub async fn change_password(&self, form: ChangePasswordForm) -> SocietyResult<()> {
        if !self.state.borrow().is_authenticated() {
            return Err(SocietyError::NotAuthenticated);
        }
        check(&form)?;

        self.dispatch(SessionAction::Pending);
        match self
            .gateway
            .change_password(&form.current_password, &form.new_password)
            .await
        {
            Ok(()) => {
                self.dispatch(SessionAction::Settled);
                self.notifications.success("Password changed", None);
                Ok(())
            }
            Err(e) => {
                let e = SocietyError::from(e);
                self.fail(&e, "Password change failed");
                Err(e)
            }
        }
    }

    /// Adopt a backend session that is still active (application start).
    /// Returns the restored identity, if any.
    pub async fn restore(&self) -> SocietyResult<Option<Identity>> {
        self.dispatch(SessionAction::Pending);

        let result = self.current_identity().await;

        match result {
            Ok(identity) => {
                if let Some(identity) = &identity {
                    info!(uid = %identity.uid, "Session restored");
                    self.directory.upsert(identity.clone());
                }
                self.dispatch(SessionAction::SetIdentity(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                self.dispatch(SessionAction::Rejected(e.to_string()));
                Err(e)
            }
        }
    }

    /// Replace the identity directly (e.g. from an auth-state listener).
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.dispatch(SessionAction::SetIdentity(identity));
    }

    pub fn clear_error(&self) {
        self.dispatch(SessionAction::ClearError);
    }

    async fn create_identity(
        &self,
        form: &SignupForm,
        fields: ProfileDocument,
    ) -> SocietyResult<Identity> {
        let account = self.gateway.create_account(&form.email, &form.password).await?;
        let stored = self
            .gateway
            .create_profile_document(&account.uid, fields)
            .await?;
        Ok(Identity::from_document(account.uid, account.email, stored))
    }

    async fn sign_in_identity(&self, credentials: &LoginCredentials) -> SocietyResult<Identity> {
        let signed_in = self
            .gateway
            .sign_in(&credentials.email, &credentials.password)
            .await?;
        let uid = signed_in.account.uid;
        match self.gateway.get_profile_document(&uid).await? {
            Some(doc) => Ok(Identity::from_document(uid, signed_in.account.email, doc)),
            None => {
                // Don't leave a backend session behind for a user the
                // application cannot represent.
                if let Err(e) = self.gateway.sign_out().await {
                    warn!(error = %e, "Sign-out after missing profile failed");
                }
                Err(SocietyError::ProfileNotFound { uid })
            }
        }
    }

    async fn current_identity(&self) -> SocietyResult<Option<Identity>> {
        let Some(account) = self.gateway.current_account().await? else {
            return Ok(None);
        };
        let doc = self.gateway.get_profile_document(&account.uid).await?;
        Ok(doc.map(|doc| Identity::from_document(account.uid, account.email, doc)))
    }

    /// Failed login/registration: no identity remains.
    fn reject(&self, err: &SocietyError, title: &str) {
        let reason = err.to_string();
        self.dispatch(SessionAction::Rejected(reason.clone()));
        self.notifications.error(title, Some(reason));
    }

    /// Failed operation that leaves the identity in place.
    fn fail(&self, err: &SocietyError, title: &str) {
        let reason = err.to_string();
        self.dispatch(SessionAction::Failed(reason.clone()));
        self.notifications.error(title, Some(reason));
    }
}
