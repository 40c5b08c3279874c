//! Session layer configuration.

/// Configuration shared by the session store, router, notification
/// center and theme store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long transition notifications stay visible, in milliseconds
    /// (default: 5000). `0` keeps them until dismissed.
    pub notification_duration_ms: u64,
    /// Where unauthenticated navigation is sent (default: `/login`).
    pub login_path: String,
    /// Landing path for an authenticated identity without a recognised
    /// role (default: `/profile`).
    pub fallback_landing_path: String,
    /// Storage key of the persisted theme (default: `societyTheme`).
    pub theme_storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            notification_duration_ms: 5000,
            login_path: "/login".into(),
            fallback_landing_path: "/profile".into(),
            theme_storage_key: "societyTheme".into(),
        }
    }
}
