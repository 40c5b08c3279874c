//! SocietySync — application entry point.
//!
//! Wires the session layer against the in-process gateway, restores any
//! live session and resolves every path given on the command line.

mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use society_core::{LoginCredentials, Role, UserStatus};
use society_gateway::MemoryGateway;
use society_session::{
    FileThemeStorage, GuardDecision, NotificationCenter, RouteTable, Router, SessionConfig,
    SessionStore, ThemeStore, UserDirectory,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AdminSeed, AppConfig};
use crate::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("society=info".parse().unwrap()),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    info!(
        app = %config.app_name,
        version = %config.app_version,
        environment = %config.environment,
        api_url = %config.api_url,
        "Starting SocietySync..."
    );

    let session_config = SessionConfig::default();
    let gateway = Arc::new(MemoryGateway::new());
    if let Some(admin) = &config.admin {
        if config.is_staging() || config.is_production() {
            warn!(
                environment = %config.environment,
                "Provisioning an administrator from environment variables"
            );
        }
        seed_admin(&gateway, admin).await?;
    }

    let notifications =
        NotificationCenter::new(Duration::from_millis(session_config.notification_duration_ms));
    let directory = Arc::new(UserDirectory::new(gateway.clone()));
    let store = SessionStore::new(gateway.clone(), directory.clone(), notifications);
    let theme = ThemeStore::load(
        FileThemeStorage::new(&config.theme_dir),
        session_config.theme_storage_key.clone(),
    );
    info!(theme = %theme.theme().name, dir = %config.theme_dir.display(), "Theme loaded");

    if let Err(e) = store.restore().await {
        warn!(error = %e, "Could not restore session");
    }

    if let (Some(admin), false) = (&config.admin, store.state().is_authenticated()) {
        store
            .login(LoginCredentials::new(&admin.email, &admin.password))
            .await?;
    }

    if store.state().role() == Some(Role::Admin) {
        directory.fetch_all().await?;
        let stats = directory.stats();
        info!(
            total = stats.total,
            active = stats.active,
            admins = stats.admins,
            residents = stats.residents,
            security = stats.security,
            "Directory loaded"
        );
    }

    let router = Router::new(RouteTable::default(), &session_config);
    let state = store.state();
    for path in std::env::args().skip(1) {
        let (target, decision) = router.resolve(&path, &state);
        match decision {
            GuardDecision::Render { view, params } => {
                info!(path = %path, target = %target, view = ?view, params = ?params, "Render");
            }
            GuardDecision::NotFound => info!(path = %path, "Not found"),
            other => info!(path = %path, target = %target, decision = ?other, "Unresolved"),
        }
    }

    let menu: Vec<&str> = router.menu(&state).iter().map(|item| item.label).collect();
    info!(
        uid = ?state.identity.as_ref().map(|i| i.uid.as_str()),
        role = ?state.role(),
        menu = ?menu,
        "Session ready"
    );

    if config.is_development() {
        for notification in store.notifications().list() {
            info!(kind = ?notification.kind, title = %notification.title, "Pending notification");
        }
    }

    info!("SocietySync stopped.");
    Ok(())
}

async fn seed_admin(gateway: &MemoryGateway, admin: &AdminSeed) -> Result<(), AppError> {
    let mut fields = Map::new();
    fields.insert("firstName".into(), Value::from("Society"));
    fields.insert("lastName".into(), Value::from("Admin"));
    let account = gateway
        .seed_account(&admin.email, &admin.password, Role::Admin, UserStatus::Active, fields)
        .await?;
    info!(uid = %account.uid, email = %account.email, "Administrator provisioned");
    Ok(())
}
