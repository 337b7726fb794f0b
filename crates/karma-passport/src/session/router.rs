use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ClientStorageSnapshot, LoginForm, Session};
use super::guard::{navigation_for, resolve, NavItem, RouteDecision};
use super::service::{SessionService, SessionStore};
use super::SessionError;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub token: String,
    pub session: Session,
    /// Values a browser client may persist to survive reloads.
    pub storage: ClientStorageSnapshot,
    pub navigation: &'static [NavItem],
}

impl SessionView {
    fn from_session(session: Session) -> Result<Self, SessionError> {
        Ok(Self {
            token: session.id.0.clone(),
            storage: ClientStorageSnapshot::signed_in(&session.user)?,
            navigation: navigation_for(session.user.role),
            session,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

/// Router builder exposing login, logout, restore, and route resolution.
pub fn session_router<S>(service: Arc<SessionService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/session",
            post(login_handler::<S>)
                .get(current_handler::<S>)
                .delete(logout_handler::<S>),
        )
        .route("/api/v1/session/restore", post(restore_handler::<S>))
        .route("/api/v1/routes/resolve", get(resolve_handler::<S>))
        .with_state(service)
}

/// `Authorization: Bearer <token>` value, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that rejects requests without an active session and exposes
/// the [`Session`] to downstream handlers as an extension.
pub async fn require_session<S>(
    State(service): State<Arc<SessionService<S>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: SessionStore + 'static,
{
    let outcome = match bearer_token(request.headers()) {
        Some(token) => service.authenticate(token, Utc::now()),
        None => Err(SessionError::NotAuthenticated),
    };

    match outcome {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<SessionService<S>>>,
    Json(form): Json<LoginForm>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service
        .login(&form, Utc::now())
        .and_then(SessionView::from_session)
    {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn restore_handler<S>(
    State(service): State<Arc<SessionService<S>>>,
    Json(snapshot): Json<ClientStorageSnapshot>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service
        .restore(&snapshot, Utc::now())
        .and_then(SessionView::from_session)
    {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn current_handler<S>(
    State(service): State<Arc<SessionService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return error_response(SessionError::NotAuthenticated);
    };

    match service
        .authenticate(token, Utc::now())
        .and_then(SessionView::from_session)
    {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn logout_handler<S>(
    State(service): State<Arc<SessionService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return error_response(SessionError::NotAuthenticated);
    };

    match service.logout(token) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn resolve_handler<S>(
    State(service): State<Arc<SessionService<S>>>,
    headers: HeaderMap,
    Query(query): Query<ResolveQuery>,
) -> Response
where
    S: SessionStore + 'static,
{
    let now = Utc::now();
    let session = bearer_token(&headers).and_then(|token| service.authenticate(token, now).ok());
    let decision: RouteDecision = resolve(&query.path, session.as_ref(), now);
    (StatusCode::OK, Json(decision)).into_response()
}

/// Handler for `GET /api/v1/navigation` behind [`require_session`].
pub async fn navigation_handler(Extension(session): Extension<Session>) -> Json<serde_json::Value> {
    Json(json!({
        "role": session.user.role,
        "items": navigation_for(session.user.role),
    }))
}

pub(crate) fn error_response(err: SessionError) -> Response {
    (err.status_code(), Json(json!({ "error": err.to_string() }))).into_response()
}
