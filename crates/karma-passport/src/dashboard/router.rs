use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::views::TaskBoardView;
use crate::data::{DashboardDataSource, UserProfile};
use crate::error::AppError;
use crate::karma::KarmaInsights;
use crate::session::{navigation_handler, Session};
use crate::tasks::{DeliveryProof, DeliveryProofForm, TaskFilter};

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Router builder for the signed-in dashboard pages.
///
/// Every handler expects a [`Session`] extension, so mount this behind
/// [`crate::session::require_session`].
pub fn dashboard_router<D>(data: Arc<D>) -> Router
where
    D: DashboardDataSource + 'static,
{
    Router::new()
        .route("/api/v1/profile", get(profile_handler::<D>))
        .route("/api/v1/karma/insights", get(insights_handler::<D>))
        .route("/api/v1/tasks", get(tasks_handler::<D>))
        .route("/api/v1/tasks/proofs", post(proof_handler))
        .route("/api/v1/navigation", get(navigation_handler))
        .with_state(data)
}

pub(crate) async fn profile_handler<D>(
    State(data): State<Arc<D>>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserProfile>, AppError>
where
    D: DashboardDataSource + 'static,
{
    let profile = data.fetch_user_profile()?;
    Ok(Json(profile.for_session_user(&session.user)))
}

pub(crate) async fn insights_handler<D>(
    State(data): State<Arc<D>>,
) -> Result<Json<KarmaInsights>, AppError>
where
    D: DashboardDataSource + 'static,
{
    let profile = data.fetch_user_profile()?;
    let insights = KarmaInsights::derive(f64::from(profile.karma_score.score), &profile.activity);
    Ok(Json(insights))
}

pub(crate) async fn tasks_handler<D>(
    State(data): State<Arc<D>>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<TaskBoardView>, AppError>
where
    D: DashboardDataSource + 'static,
{
    let filter: TaskFilter = match query.status.as_deref() {
        Some(raw) => raw.parse()?,
        None => TaskFilter::All,
    };
    let tasks = data.fetch_tasks()?;
    Ok(Json(TaskBoardView::build(&tasks, filter)))
}

pub(crate) async fn proof_handler(
    Extension(session): Extension<Session>,
    Json(form): Json<DeliveryProofForm>,
) -> Result<(StatusCode, Json<DeliveryProof>), AppError> {
    let proof = form.accept(Utc::now())?;
    info!(
        proof_id = %proof.id,
        user_id = %session.user.id,
        platform = %proof.platform,
        tasks = proof.number_of_tasks,
        "delivery proof submitted for verification"
    );
    Ok((StatusCode::CREATED, Json(proof)))
}
