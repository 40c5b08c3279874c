//! Session state snapshot and its reducer.
//!
//! Every change to the session goes through [`reduce`], which returns a
//! complete new snapshot. The store publishes that snapshot in one step,
//! so observers never see a half-applied transition.

use society_core::{Identity, ProfileDocument, Role};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// A transition is in flight.
    pub loading: bool,
    /// Reason of the last failed transition.
    pub error: Option<String>,
}

/// Coarse state of the session machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    /// Anonymous with an error from the last attempt.
    AuthError,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().and_then(|i| i.role)
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.identity, self.loading, &self.error) {
            (Some(_), _, _) => SessionPhase::Authenticated,
            (None, true, _) => SessionPhase::Authenticating,
            (None, false, Some(_)) => SessionPhase::AuthError,
            (None, false, None) => SessionPhase::Anonymous,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// A transition was dispatched.
    Pending,
    /// Login or registration resolved with a full identity.
    Authenticated(Identity),
    /// Login or registration failed; no identity remains.
    Rejected(String),
    /// Profile update resolved with the fields the backend returned.
    ProfileUpdated(ProfileDocument),
    /// A transition failed without affecting who is signed in.
    Failed(String),
    /// A transition that does not change the identity resolved.
    Settled,
    LoggedOut,
    SetIdentity(Option<Identity>),
    ClearError,
}

pub fn reduce(state: &SessionState, action: &SessionAction) -> SessionState {
    match action {
        SessionAction::Pending => SessionState {
            identity: state.identity.clone(),
            loading: true,
            error: None,
        },
        SessionAction::Authenticated(identity) => SessionState {
            identity: Some(identity.clone()),
            loading: false,
            error: None,
        },
        SessionAction::Rejected(reason) => SessionState {
            identity: None,
            loading: false,
            error: Some(reason.clone()),
        },
        SessionAction::ProfileUpdated(fields) => {
            // A logout that resolved first wins; the update is dropped.
            let identity = state.identity.clone().map(|mut identity| {
                identity.merge(fields);
                identity
            });
            SessionState {
                identity,
                loading: false,
                error: None,
            }
        }
        SessionAction::Failed(reason) => SessionState {
            identity: state.identity.clone(),
            loading: false,
            error: Some(reason.clone()),
        },
        SessionAction::Settled => SessionState {
            identity: state.identity.clone(),
            loading: false,
            error: state.error.clone(),
        },
        SessionAction::LoggedOut => SessionState::default(),
        SessionAction::SetIdentity(identity) => SessionState {
            identity: identity.clone(),
            loading: false,
            error: None,
        },
        SessionAction::ClearError => SessionState {
            error: None,
            ..state.clone()
        },
    }
}
