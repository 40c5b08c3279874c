//! Application configuration, read from `SOCIETY_*` environment variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(AppError::Config(format!("unknown environment `{other}`"))),
        }
    }
}

/// Credentials of an administrator provisioned at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment environment (`SOCIETY_APP_ENV`, default: development).
    pub environment: Environment,
    /// Backend base URL (`SOCIETY_API_URL`).
    pub api_url: String,
    /// Display name (`SOCIETY_APP_NAME`).
    pub app_name: String,
    /// Version string (`SOCIETY_APP_VERSION`).
    pub app_version: String,
    /// Directory holding the persisted theme (`SOCIETY_THEME_DIR`).
    pub theme_dir: PathBuf,
    /// Present only when both `SOCIETY_ADMIN_EMAIL` and
    /// `SOCIETY_ADMIN_PASSWORD` are set.
    pub admin: Option<AdminSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            api_url: "http://localhost:8080".into(),
            app_name: "Society Management System".into(),
            app_version: "1.0.0".into(),
            theme_dir: PathBuf::from(".society"),
            admin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Empty
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let environment = match var("SOCIETY_APP_ENV") {
            Some(raw) => raw.parse()?,
            None => defaults.environment,
        };
        let admin = match (var("SOCIETY_ADMIN_EMAIL"), var("SOCIETY_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "SOCIETY_ADMIN_EMAIL and SOCIETY_ADMIN_PASSWORD must be set together".into(),
                ));
            }
        };

        Ok(Self {
            environment,
            api_url: var("SOCIETY_API_URL").unwrap_or(defaults.api_url),
            app_name: var("SOCIETY_APP_NAME").unwrap_or(defaults.app_name),
            app_version: var("SOCIETY_APP_VERSION").unwrap_or(defaults.app_version),
            theme_dir: var("SOCIETY_THEME_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.theme_dir),
            admin,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_staging(&self) -> bool {
        self.environment == Environment::Staging
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
