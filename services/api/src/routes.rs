use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use karma_passport::dashboard::dashboard_router;
use karma_passport::data::DashboardDataSource;
use karma_passport::loans::{loan_router, LoanApplicationService, LoanLedger};
use karma_passport::session::{require_session, session_router, SessionService, SessionStore};
use serde_json::json;
use std::sync::Arc;

/// Public session routes plus the dashboard and loan routes behind the session guard.
pub(crate) fn api_router<S, D, L>(
    sessions: Arc<SessionService<S>>,
    data: Arc<D>,
    loans: Arc<LoanApplicationService<D, L>>,
) -> Router
where
    S: SessionStore + 'static,
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    let gated = dashboard_router(data)
        .merge(loan_router(loans))
        .route_layer(from_fn_with_state(sessions.clone(), require_session::<S>));

    session_router(sessions)
        .merge(gated)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
