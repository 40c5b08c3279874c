//! User-customisable theme, persisted under a fixed storage key.
//!
//! Loading never fails: a missing, unreadable or corrupt blob falls back
//! to [`ThemeConfig::default`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ThemeError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub primary_dark: String,
    pub primary_light: String,
    pub secondary: String,
    pub secondary_dark: String,
    pub secondary_light: String,
    pub accent: String,
    pub accent_dark: String,
    pub accent_light: String,
    pub background: String,
    pub background_gradient: String,
    pub text: String,
    pub text_light: String,
    pub error: String,
    pub success: String,
    pub warning: String,
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeLogo {
    pub icon: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeConfig {
    pub colors: ThemeColors,
    pub logo: ThemeLogo,
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            colors: ThemeColors {
                primary: "#FF9800".into(),
                primary_dark: "#FF6F00".into(),
                primary_light: "#FFB74D".into(),
                secondary: "#003366".into(),
                secondary_dark: "#00274F".into(),
                secondary_light: "#004C99".into(),
                accent: "#4CAF50".into(),
                accent_dark: "#388E3C".into(),
                accent_light: "#81C784".into(),
                background: "#FFFFFF".into(),
                background_gradient: "from-[#FFEF80] via-[#FFCB45] to-[#FFA726]".into(),
                text: "#333333".into(),
                text_light: "#666666".into(),
                error: "#F44336".into(),
                success: "#4CAF50".into(),
                warning: "#FF9800".into(),
                info: "#2196F3".into(),
            },
            logo: ThemeLogo {
                icon: "Building".into(),
                text: "SocietySync".into(),
            },
            name: "SocietySync".into(),
        }
    }
}

/// Key-value storage for serialized theme blobs.
pub trait ThemeStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, ThemeError>;
    fn write(&self, key: &str, value: &str) -> Result<(), ThemeError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileThemeStorage {
    dir: PathBuf,
}

impl FileThemeStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ThemeStorage for FileThemeStorage {
    fn read(&self, key: &str) -> Result<Option<String>, ThemeError> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryThemeStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryThemeStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStorage for MemoryThemeStorage {
    fn read(&self, key: &str) -> Result<Option<String>, ThemeError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct ThemeStore<S: ThemeStorage> {
    storage: S,
    key: String,
    theme: watch::Sender<ThemeConfig>,
}

impl<S: ThemeStorage> ThemeStore<S> {
    /// Read the persisted theme, falling back to the default.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let theme = match storage.read(&key) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Saved theme is corrupt, using default");
                ThemeConfig::default()
            }),
            Ok(None) => ThemeConfig::default(),
            Err(e) => {
                warn!(key = %key, error = %e, "Saved theme unreadable, using default");
                ThemeConfig::default()
            }
        };
        let (theme, _) = watch::channel(theme);
        Self {
            storage,
            key,
            theme,
        }
    }

    pub fn theme(&self) -> ThemeConfig {
        self.theme.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeConfig> {
        self.theme.subscribe()
    }

    /// Replace the theme and persist it. The in-memory theme changes even
    /// when persisting fails.
    pub fn set_theme(&self, theme: ThemeConfig) -> Result<(), ThemeError> {
        self.theme.send_replace(theme);
        self.persist()
    }

    pub fn update(&self, f: impl FnOnce(&mut ThemeConfig)) -> Result<(), ThemeError> {
        self.theme.send_modify(f);
        self.persist()
    }

    pub fn reset(&self) -> Result<(), ThemeError> {
        self.set_theme(ThemeConfig::default())
    }

    fn persist(&self) -> Result<(), ThemeError> {
        let blob = serde_json::to_string(&*self.theme.borrow())?;
        self.storage.write(&self.key, &blob)?;
        debug!(key = %self.key, "Theme saved");
        Ok(())
    }
}
