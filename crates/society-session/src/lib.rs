//! SocietySync Session — client-side authorization and session state.
//!
//! - [`SessionStore`]: who is signed in, and the outcome of the last
//!   transition
//! - [`UserDirectory`]: cached user records for administration
//! - [`Router`]: role-gated navigation decisions
//! - [`NotificationCenter`]: auto-expiring user feedback
//! - [`ThemeStore`]: persisted visual theme

pub mod config;
pub mod directory;
pub mod error;
pub mod notification;
pub mod router;
pub mod state;
pub mod store;
pub mod theme;

pub use config::SessionConfig;
pub use directory::{DirectoryFilter, DirectoryState, DirectoryStats, UserDirectory};
pub use error::ThemeError;
pub use notification::{Notification, NotificationCenter, NotificationId, NotificationKind};
pub use router::{Access, GuardDecision, MenuItem, RouteTable, Router, View};
pub use state::{SessionAction, SessionPhase, SessionState};
pub use store::SessionStore;
pub use theme::{FileThemeStorage, MemoryThemeStorage, ThemeConfig, ThemeStorage, ThemeStore};
