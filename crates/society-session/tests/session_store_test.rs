//! Integration tests for the session store against the in-memory gateway.

use std::sync::Arc;

use serde_json::json;
use society_core::{
    Account, ChangePasswordForm, Gender, GatewayResult, IdentityGateway, LoginCredentials,
    PasswordResetRequest, ProfileDocument, ProfileUpdate, Role, SignIn, SignupForm, SocietyError,
    UserStatus, UserType,
};
use society_gateway::MemoryGateway;
use society_session::{
    NotificationCenter, NotificationKind, SessionPhase, SessionState, SessionStore, UserDirectory,
};
use tokio::sync::Notify;

fn setup_with<G: IdentityGateway>(gateway: Arc<G>) -> SessionStore<G> {
    let directory = Arc::new(UserDirectory::new(gateway.clone()));
    SessionStore::new(gateway, directory, NotificationCenter::default())
}

fn setup() -> (Arc<MemoryGateway>, SessionStore<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::new());
    (gateway.clone(), setup_with(gateway))
}

fn signup(email: &str) -> SignupForm {
    SignupForm {
        first_name: "Asha".into(),
        last_name: "Verma".into(),
        gender: Gender::Female,
        email: email.into(),
        phone_number: "9876543210".into(),
        password: "12345678".into(),
        confirm_password: "12345678".into(),
        state: "Karnataka".into(),
        city: "Bengaluru".into(),
        pin_number: "560001".into(),
        address: "12 Lake Road".into(),
        street_tower: "Tower B".into(),
        floor_number: "4".into(),
        house_number: "402".into(),
        aadhar_card: "1234567890".into(),
        property_id: Some("P-77".into()),
        ppp_id: None,
        user_type: UserType::Owner,
        profile_picture: None,
        agree_to_terms: true,
    }
}

fn doc(value: serde_json::Value) -> ProfileDocument {
    value.as_object().cloned().unwrap()
}

fn kinds(store: &SessionStore<impl IdentityGateway>) -> Vec<NotificationKind> {
    store.notifications().list().into_iter().map(|n| n.kind).collect()
}

#[tokio::test]
async fn register_authenticates_and_notifies() {
    let (_gw, store) = setup();

    let identity = store.register(signup("a@b.com")).await.unwrap();

    let state = store.state();
    assert!(state.is_authenticated());
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.phase(), SessionPhase::Authenticated);
    assert_eq!(kinds(&store), vec![NotificationKind::Success]);

    // Backend-assigned role and status; no secrets in the profile.
    assert_eq!(identity.role, Some(Role::Resident));
    assert_eq!(identity.status, Some(UserStatus::Pending));
    assert_eq!(identity.email, "a@b.com");
    assert!(identity.field("password").is_none());
    assert_eq!(identity.field("propertyID"), Some("P-77"));

    // The directory holds the caller's own entry.
    assert_eq!(store.directory().get(&identity.uid), Some(identity));
}

#[tokio::test]
async fn invalid_signup_never_touches_session_state() {
    let (_gw, store) = setup();
    let mut form = signup("a@b.com");
    form.confirm_password = "87654321".into();
    form.agree_to_terms = false;

    let err = store.register(form).await.unwrap_err();

    match err {
        SocietyError::Validation(errors) => {
            assert!(errors.contains("confirmPassword"));
            assert!(errors.contains("agreeToTerms"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert_eq!(store.state(), SessionState::default());
    assert!(store.notifications().list().is_empty());
}

#[tokio::test]
async fn duplicate_registration_lands_in_auth_error() {
    let (_gw, store) = setup();
    store.register(signup("dup@example.com")).await.unwrap();
    store.logout().await;

    let err = store.register(signup("dup@example.com")).await.unwrap_err();
    assert_eq!(err.to_string(), "email already in use");

    let state = store.state();
    assert_eq!(state.phase(), SessionPhase::AuthError);
    assert_eq!(state.error.as_deref(), Some("email already in use"));
    assert!(state.identity.is_none());
}

#[tokio::test]
async fn login_with_valid_credentials() {
    let (gw, store) = setup();
    gw.seed_account(
        "admin@example.com",
        "admin-pass",
        Role::Admin,
        UserStatus::Active,
        doc(json!({ "firstName": "Meera", "lastName": "Iyer" })),
    )
    .await
    .unwrap();

    let identity = store
        .login(LoginCredentials::new("admin@example.com", "admin-pass"))
        .await
        .unwrap();

    assert_eq!(identity.role, Some(Role::Admin));
    assert_eq!(identity.display_name(), "Meera Iyer");
    let state = store.state();
    assert!(state.is_authenticated());
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(kinds(&store), vec![NotificationKind::Success]);
}

#[tokio::test]
async fn login_with_bad_credentials_surfaces_reason_verbatim() {
    let (_gw, store) = setup();

    let err = store
        .login(LoginCredentials::new("bad@x.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, SocietyError::Gateway(_)));

    let state = store.state();
    assert!(!state.is_authenticated());
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("invalid credentials"));

    let notifications = store.notifications().list();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert_eq!(notifications[0].message.as_deref(), Some("invalid credentials"));
}

#[tokio::test]
async fn empty_credentials_are_a_validation_error() {
    let (_gw, store) = setup();
    let err = store.login(LoginCredentials::new("", "")).await.unwrap_err();
    assert!(matches!(err, SocietyError::Validation(_)));
    assert_eq!(store.state(), SessionState::default());
}

#[tokio::test]
async fn login_without_profile_document_is_not_authenticated() {
    let (gw, store) = setup();
    let account = gw
        .seed_account(
            "ghost@example.com",
            "password1",
            Role::Resident,
            UserStatus::Active,
            ProfileDocument::new(),
        )
        .await
        .unwrap();
    assert!(gw.delete_profile_document(&account.uid).await);

    let err = store
        .login(LoginCredentials::new("ghost@example.com", "password1"))
        .await
        .unwrap_err();

    assert!(matches!(err, SocietyError::ProfileNotFound { .. }));
    let state = store.state();
    assert!(!state.is_authenticated());
    assert_eq!(state.error.as_deref(), Some("profile not found"));
    assert_eq!(gw.current_account().await.unwrap(), None);
}

#[tokio::test]
async fn logout_clears_state_even_when_offline() {
    let (gw, store) = setup();
    store.register(signup("off@example.com")).await.unwrap();

    gw.set_offline(true).await;
    store.logout().await;

    let state = store.state();
    assert!(state.identity.is_none());
    assert!(!state.is_authenticated());
    assert_eq!(state.error, None);
    assert_eq!(
        kinds(&store),
        vec![NotificationKind::Success, NotificationKind::Success]
    );
}

#[tokio::test]
async fn clear_error_is_idempotent() {
    let (_gw, store) = setup();
    let mut rx = store.subscribe();

    store.clear_error();
    assert!(!rx.has_changed().unwrap());
    assert_eq!(store.state(), SessionState::default());

    let _ = store.login(LoginCredentials::new("x@y.com", "nope")).await;
    assert!(store.state().error.is_some());
    store.clear_error();
    assert_eq!(store.state().error, None);
    assert_eq!(store.state().phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn update_profile_changes_only_the_given_field() {
    let (_gw, store) = setup();
    let before = store.register(signup("p@example.com")).await.unwrap();

    let after = store
        .update_profile(ProfileUpdate {
            phone_number: Some("9999999999".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(after.phone_number(), Some("9999999999"));
    assert_eq!(store.state().identity.as_ref(), Some(&after));
    assert_eq!(after.uid, before.uid);
    assert_eq!(after.email, before.email);
    assert_eq!(after.role, before.role);
    assert_eq!(after.status, before.status);
    assert_eq!(after.created_at, before.created_at);

    let mut expected = before.profile.clone();
    expected.insert("phoneNumber".into(), json!("9999999999"));
    assert_eq!(after.profile, expected);

    assert_eq!(store.directory().get(&after.uid), Some(after));
}

#[tokio::test]
async fn update_profile_requires_authentication() {
    let (_gw, store) = setup();
    let err = store
        .update_profile(ProfileUpdate {
            city: Some("Pune".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SocietyError::NotAuthenticated));
    assert_eq!(err.to_string(), "not authenticated");
    assert_eq!(store.state(), SessionState::default());
}

#[tokio::test]
async fn failed_profile_update_keeps_identity() {
    let (gw, store) = setup();
    let identity = store.register(signup("keep@example.com")).await.unwrap();
    gw.set_offline(true).await;

    let err = store
        .update_profile(ProfileUpdate {
            city: Some("Pune".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "network request failed");
    let state = store.state();
    assert_eq!(state.identity, Some(identity));
    assert_eq!(state.error.as_deref(), Some("network request failed"));
    assert!(!state.loading);
}

#[tokio::test]
async fn password_reset_and_change() {
    let (gw, store) = setup();
    store.register(signup("pw@example.com")).await.unwrap();

    store
        .change_password(ChangePasswordForm {
            current_password: "12345678".into(),
            new_password: "abcdefgh".into(),
            confirm_password: "abcdefgh".into(),
        })
        .await
        .unwrap();
    store.logout().await;

    assert!(
        store
            .login(LoginCredentials::new("pw@example.com", "abcdefgh"))
            .await
            .is_ok()
    );

    store
        .send_password_reset(PasswordResetRequest {
            email: "pw@example.com".into(),
        })
        .await
        .unwrap();
    assert_eq!(gw.reset_requests().await, vec!["pw@example.com".to_string()]);
    assert!(store.state().is_authenticated());
    assert!(!store.state().loading);
}

#[tokio::test]
async fn change_password_requires_authentication() {
    let (_gw, store) = setup();
    let err = store
        .change_password(ChangePasswordForm {
            current_password: "12345678".into(),
            new_password: "abcdefgh".into(),
            confirm_password: "abcdefgh".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SocietyError::NotAuthenticated));
}

#[tokio::test]
async fn restore_adopts_live_backend_session() {
    let gateway = Arc::new(MemoryGateway::new());
    let first = setup_with(gateway.clone());
    let identity = first.register(signup("r@example.com")).await.unwrap();

    // A fresh store (application restart) against the same backend.
    let second = setup_with(gateway);
    assert!(!second.state().is_authenticated());

    let restored = second.restore().await.unwrap();
    assert_eq!(restored.map(|i| i.uid), Some(identity.uid));
    assert!(second.state().is_authenticated());
    assert!(!second.state().loading);
}

#[tokio::test]
async fn restore_without_session_stays_anonymous() {
    let (_gw, store) = setup();
    assert_eq!(store.restore().await.unwrap(), None);
    assert_eq!(store.state(), SessionState::default());
}

/// Gateway whose `sign_in` waits for an explicit release.
struct GatedGateway {
    inner: MemoryGateway,
    gate: Notify,
}

impl IdentityGateway for GatedGateway {
    async fn create_account(&self, email: &str, password: &str) -> GatewayResult<Account> {
        self.inner.create_account(email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<SignIn> {
        self.gate.notified().await;
        self.inner.sign_in(email, password).await
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.inner.sign_out().await
    }

    async fn current_account(&self) -> GatewayResult<Option<Account>> {
        self.inner.current_account().await
    }

    async fn send_password_reset(&self, email: &str) -> GatewayResult<()> {
        self.inner.send_password_reset(email).await
    }

    async fn change_password(&self, current: &str, new: &str) -> GatewayResult<()> {
        self.inner.change_password(current, new).await
    }

    async fn get_profile_document(&self, uid: &str) -> GatewayResult<Option<ProfileDocument>> {
        self.inner.get_profile_document(uid).await
    }

    async fn create_profile_document(
        &self,
        uid: &str,
        fields: ProfileDocument,
    ) -> GatewayResult<ProfileDocument> {
        self.inner.create_profile_document(uid, fields).await
    }

    async fn update_profile_document(
        &self,
        uid: &str,
        fields: ProfileDocument,
    ) -> GatewayResult<ProfileDocument> {
        self.inner.update_profile_document(uid, fields).await
    }

    async fn list_profile_documents(&self) -> GatewayResult<Vec<(String, ProfileDocument)>> {
        self.inner.list_profile_documents().await
    }
}

async fn gated_setup() -> (Arc<GatedGateway>, Arc<SessionStore<GatedGateway>>) {
    let gateway = Arc::new(GatedGateway {
        inner: MemoryGateway::new(),
        gate: Notify::new(),
    });
    gateway
        .inner
        .seed_account(
            "sec@example.com",
            "guard-pass",
            Role::Security,
            UserStatus::Active,
            ProfileDocument::new(),
        )
        .await
        .unwrap();
    (gateway.clone(), Arc::new(setup_with(gateway)))
}

#[tokio::test]
async fn loading_is_true_only_while_login_is_in_flight() {
    let (gateway, store) = gated_setup().await;
    assert!(!store.state().loading);

    let mut rx = store.subscribe();
    let task = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .login(LoginCredentials::new("sec@example.com", "guard-pass"))
                .await
        })
    };

    rx.wait_for(|s| s.loading).await.unwrap();
    let pending = store.state();
    assert!(pending.loading);
    assert!(!pending.is_authenticated());
    assert_eq!(pending.phase(), SessionPhase::Authenticating);

    gateway.gate.notify_one();
    task.await.unwrap().unwrap();

    let state = store.state();
    assert!(!state.loading);
    assert!(state.is_authenticated());
    assert_eq!(state.role(), Some(Role::Security));
}

#[tokio::test]
async fn last_resolution_wins() {
    let (gateway, store) = gated_setup().await;
    let mut rx = store.subscribe();

    let task = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .login(LoginCredentials::new("sec@example.com", "guard-pass"))
                .await
        })
    };
    rx.wait_for(|s| s.loading).await.unwrap();

    // Logout resolves first, the login resolves afterwards and overwrites.
    store.logout().await;
    assert!(!store.state().is_authenticated());

    gateway.gate.notify_one();
    task.await.unwrap().unwrap();
    assert!(store.state().is_authenticated());
}
