//! Explicit sessions in place of ambient "is authenticated" flags.
//!
//! A [`Session`] is created at login, looked up by bearer token on every
//! gated request, and invalidated at logout or once `expires_at` passes. Route
//! decisions take the session as an argument instead of reading global state.

pub mod domain;
pub mod guard;
pub mod router;
pub mod service;

use axum::http::StatusCode;

pub use domain::{
    AuthMode, ClientStorageSnapshot, Credentials, LoginForm, Session, SessionId, SessionUser,
    UserRole,
};
pub use guard::{navigation_for, resolve, NavItem, RedirectReason, Route, RouteDecision};
pub use router::{bearer_token, navigation_handler, require_session, session_router};
pub use service::{SessionService, SessionStore, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Inline form message shown next to the login/sign-up form.
    #[error("{0}")]
    Validation(String),
    #[error("sign in required")]
    NotAuthenticated,
    #[error("session not found or already signed out")]
    UnknownSession,
    #[error("session expired; sign in again")]
    Expired,
    #[error("stored user record is unreadable: {0}")]
    CorruptStoredUser(String),
    #[error("could not encode session for client storage: {0}")]
    Storage(String),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::CorruptStoredUser(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotAuthenticated | Self::UnknownSession | Self::Expired => {
                StatusCode::UNAUTHORIZED
            }
            Self::Storage(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
