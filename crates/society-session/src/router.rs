//! Role-gated routing.
//!
//! Every route belongs to exactly one access class. The router maps a
//! requested path and the current [`SessionState`] to a decision; it never
//! renders a restricted view to a role outside the route's role set, and
//! refused routes are answered with a redirect, never an error text.

use std::collections::BTreeMap;

use society_core::Role;
use tracing::debug;

use crate::config::SessionConfig;
use crate::state::SessionState;

/// Screens the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Signup,
    ForgotPassword,
    AdminDashboard,
    ResidentDashboard,
    SecurityDashboard,
    UserList,
    UserCreate,
    UserEdit,
    Profile,
    ThemeSettings,
    Notices,
    Visitors,
    Help,
    Maintenance,
    Complaints,
    Facilities,
    Events,
    SocietySettings,
    RoleManagement,
    BillingSettings,
    FinancialReports,
    VisitorReports,
    ComplaintReports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only for visitors without a session (auth forms).
    PublicOnly,
    /// Any signed-in identity.
    Authenticated,
    /// Signed-in identities holding one of the listed roles.
    Restricted(&'static [Role]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// A transition is in flight; show a neutral placeholder and decide
    /// later.
    Loading,
    Render {
        view: View,
        params: BTreeMap<String, String>,
    },
    Redirect(String),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: &'static str,
    pub access: Access,
    pub view: View,
    /// Sidebar label; `None` keeps the route out of the menu.
    pub label: Option<&'static str>,
}

/// Sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub path: &'static str,
    pub label: &'static str,
    pub view: View,
}

const ADMIN: &[Role] = &[Role::Admin];
const RESIDENT: &[Role] = &[Role::Resident];
const SECURITY: &[Role] = &[Role::Security];
const ADMIN_RESIDENT: &[Role] = &[Role::Admin, Role::Resident];

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        use Access::*;

        Self {
            routes: vec![
                route("/", PublicOnly, View::Login, None),
                route("/login", PublicOnly, View::Login, None),
                route("/signup", PublicOnly, View::Signup, None),
                route("/forgot-password", PublicOnly, View::ForgotPassword, None),
                route("/admin", Restricted(ADMIN), View::AdminDashboard, Some("Admin Dashboard")),
                route("/dashboard", Restricted(RESIDENT), View::ResidentDashboard, Some("Dashboard")),
                route(
                    "/security-dashboard",
                    Restricted(SECURITY),
                    View::SecurityDashboard,
                    Some("Security Dashboard"),
                ),
                route("/notices", Authenticated, View::Notices, Some("Notices")),
                route("/maintenance", Restricted(ADMIN_RESIDENT), View::Maintenance, Some("Maintenance")),
                route("/visitors", Authenticated, View::Visitors, Some("Visitors")),
                route("/complaints", Restricted(ADMIN_RESIDENT), View::Complaints, Some("Complaints")),
                route("/facilities", Restricted(ADMIN_RESIDENT), View::Facilities, Some("Facilities")),
                route("/events", Restricted(ADMIN_RESIDENT), View::Events, Some("Events")),
                route("/users", Restricted(ADMIN), View::UserList, Some("User Management")),
                route("/users/add", Restricted(ADMIN), View::UserCreate, None),
                route("/users/edit/:uid", Restricted(ADMIN), View::UserEdit, None),
                route("/society-settings", Restricted(ADMIN), View::SocietySettings, Some("Society Settings")),
                route("/roles", Restricted(ADMIN), View::RoleManagement, Some("Role Management")),
                route("/billing-settings", Restricted(ADMIN), View::BillingSettings, Some("Billing Settings")),
                route("/financial-reports", Restricted(ADMIN), View::FinancialReports, Some("Financial Reports")),
                route("/visitor-reports", Restricted(ADMIN), View::VisitorReports, Some("Visitor Reports")),
                route("/complaint-reports", Restricted(ADMIN), View::ComplaintReports, Some("Complaint Reports")),
                route("/profile", Authenticated, View::Profile, Some("Profile")),
                route("/settings/theme", Authenticated, View::ThemeSettings, Some("Theme")),
                route("/help", Authenticated, View::Help, Some("Help & Support")),
            ],
        }
    }
}

fn route(pattern: &'static str, access: Access, view: View, label: Option<&'static str>) -> Route {
    Route {
        pattern,
        access,
        view,
        label,
    }
}

impl RouteTable {
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route whose pattern matches the normalised `path`, with the
    /// captured `:param` segments.
    pub fn find(&self, path: &str) -> Option<(&Route, BTreeMap<String, String>)> {
        let segments = segments(path);
        self.routes
            .iter()
            .find_map(|route| match_pattern(route.pattern, &segments).map(|params| (route, params)))
    }
}

/// Decides, per navigation attempt, what the user gets to see.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    login_path: String,
    fallback_landing_path: String,
}

/// Redirect hops [`Router::resolve`] follows before giving up.
const MAX_REDIRECTS: usize = 4;

impl Router {
    pub fn new(table: RouteTable, config: &SessionConfig) -> Self {
        Self {
            table,
            login_path: config.login_path.clone(),
            fallback_landing_path: config.fallback_landing_path.clone(),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Default landing path for a role; identities without a recognised
    /// role land on the generic authenticated page.
    pub fn landing_path(&self, role: Option<Role>) -> &str {
        match role {
            Some(Role::Admin) => "/admin",
            Some(Role::Resident) => "/dashboard",
            Some(Role::Security) => "/security-dashboard",
            None => self.fallback_landing_path.as_str(),
        }
    }

    pub fn decide(&self, path: &str, state: &SessionState) -> GuardDecision {
        if state.loading {
            return GuardDecision::Loading;
        }

        let Some((route, params)) = self.table.find(&normalize(path)) else {
            return GuardDecision::NotFound;
        };

        let render = || GuardDecision::Render {
            view: route.view,
            params: params.clone(),
        };

        let decision = match route.access {
            Access::PublicOnly if state.is_authenticated() => {
                GuardDecision::Redirect(self.landing_path(state.role()).to_string())
            }
            Access::PublicOnly => render(),
            Access::Authenticated | Access::Restricted(_) if !state.is_authenticated() => {
                GuardDecision::Redirect(self.login_path.clone())
            }
            Access::Authenticated => render(),
            Access::Restricted(roles) => match state.role() {
                Some(role) if roles.contains(&role) => render(),
                role => GuardDecision::Redirect(self.landing_path(role).to_string()),
            },
        };

        if let GuardDecision::Redirect(to) = &decision {
            debug!(from = path, to = %to, "Navigation redirected");
        }
        decision
    }

    /// Follow redirects from `path` and return the final path with its
    /// decision. Stops after a bounded number of hops, answering
    /// `NotFound` rather than looping.
    pub fn resolve(&self, path: &str, state: &SessionState) -> (String, GuardDecision) {
        let mut current = normalize(path);
        for _ in 0..=MAX_REDIRECTS {
            match self.decide(&current, state) {
                GuardDecision::Redirect(next) if next != current => current = next,
                GuardDecision::Redirect(_) => break,
                decision => return (current, decision),
            }
        }
        (current, GuardDecision::NotFound)
    }

    /// Menu entries the current session may open, in table order.
    pub fn menu(&self, state: &SessionState) -> Vec<MenuItem> {
        if !state.is_authenticated() {
            return Vec::new();
        }
        let role = state.role();
        self.table
            .routes
            .iter()
            .filter_map(|route| {
                let label = route.label?;
                let allowed = match route.access {
                    Access::PublicOnly => false,
                    Access::Authenticated => true,
                    Access::Restricted(roles) => role.is_some_and(|r| roles.contains(&r)),
                };
                allowed.then_some(MenuItem {
                    path: route.pattern,
                    label,
                    view: route.view,
                })
            })
            .collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouteTable::default(), &SessionConfig::default())
    }
}

/// Strip query and fragment, collapse repeated slashes and drop a
/// trailing slash. The root stays `/`.
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let joined = segments(path).join("/");
    format!("/{joined}")
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_pattern(pattern: &str, path: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern = segments(pattern);
    if pattern.len() != path.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (expected, actual) in pattern.iter().zip(path) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}
