use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Session, UserRole};

/// Pages of the dashboard application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    Login,
    Dashboard,
    PlatformManager,
    Personal,
    Loans,
    MyTasks,
    Lender,
}

impl Route {
    pub const fn all() -> [Self; 8] {
        [
            Self::Landing,
            Self::Login,
            Self::Dashboard,
            Self::PlatformManager,
            Self::Personal,
            Self::Loans,
            Self::MyTasks,
            Self::Lender,
        ]
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::PlatformManager => "/platform-manager",
            Self::Personal => "/personal",
            Self::Loans => "/loans",
            Self::MyTasks => "/my-tasks",
            Self::Lender => "/lender",
        }
    }

    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Landing | Self::Login)
    }

    /// Matches a request path, ignoring query strings, fragments, and a trailing slash.
    pub fn from_path(raw: &str) -> Option<Self> {
        let path = raw.split(['?', '#']).next().unwrap_or_default().trim();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::all().into_iter().find(|route| route.path() == path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    SignInRequired,
    UnknownPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteDecision {
    Render {
        route: Route,
    },
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
}

/// Gated pages render only with an active session; anything unmatched goes home.
pub fn resolve(path: &str, session: Option<&Session>, now: DateTime<Utc>) -> RouteDecision {
    let Some(route) = Route::from_path(path) else {
        return RouteDecision::Redirect {
            to: Route::Landing.path(),
            reason: RedirectReason::UnknownPath,
        };
    };

    let signed_in = session.is_some_and(|session| session.is_active(now));
    if route.requires_session() && !signed_in {
        return RouteDecision::Redirect {
            to: Route::Login.path(),
            reason: RedirectReason::SignInRequired,
        };
    }

    RouteDecision::Render { route }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn nav(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const WORKER_MENU: [NavItem; 5] = [
    nav("Dashboard", Route::Dashboard.path()),
    nav("Submit Work", "/submit-work"),
    nav("My Tasks", Route::MyTasks.path()),
    nav("Loans", Route::Loans.path()),
    nav("Profile", Route::Personal.path()),
];

const LENDER_MENU: [NavItem; 4] = [
    nav("Dashboard", Route::Dashboard.path()),
    nav("Active Loans", Route::Lender.path()),
    nav("Portfolio", "/portfolio"),
    nav("Settings", "/settings"),
];

const COMPANY_MENU: [NavItem; 4] = [
    nav("Dashboard", Route::Dashboard.path()),
    nav("Manage Tasks", Route::PlatformManager.path()),
    nav("Team", "/team"),
    nav("Analytics", "/analytics"),
];

/// Sidebar entries for a role.
pub fn navigation_for(role: UserRole) -> &'static [NavItem] {
    match role {
        UserRole::Worker => &WORKER_MENU,
        UserRole::Lender => &LENDER_MENU,
        UserRole::Company => &COMPANY_MENU,
    }
}
