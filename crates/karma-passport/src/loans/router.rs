use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use super::application::{
    check_can_apply, LoanApplicationId, LoanApplicationService, LoanLedger, LoanServiceError,
};
use super::domain::{LoanQuote, LoanTerms, QuoteRequest};
use super::quote::{format_amount, format_due_date};
use crate::data::DashboardDataSource;

#[derive(Debug, Serialize)]
pub struct LoanTermsView {
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub eligible: bool,
    pub effective_limit: u64,
    pub effective_limit_display: String,
    pub can_apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

impl LoanTermsView {
    pub fn from_terms(terms: LoanTerms) -> Self {
        let blocked_reason = check_can_apply(&terms).err().map(|reason| reason.to_string());
        Self {
            eligible: terms.is_eligible(),
            effective_limit: terms.effective_limit(),
            effective_limit_display: format_amount(&terms.base_currency, terms.effective_limit()),
            can_apply: blocked_reason.is_none(),
            blocked_reason,
            terms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoanQuoteView {
    #[serde(flatten)]
    pub quote: LoanQuote,
    pub due_date_display: String,
    pub total_repayable_display: String,
}

/// Router builder exposing loan terms, quotes, and applications.
pub fn loan_router<D, L>(service: Arc<LoanApplicationService<D, L>>) -> Router
where
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    Router::new()
        .route("/api/v1/loans/terms", get(terms_handler::<D, L>))
        .route("/api/v1/loans/quote", post(quote_handler::<D, L>))
        .route("/api/v1/loans/applications", post(submit_handler::<D, L>))
        .route(
            "/api/v1/loans/applications/:application_id",
            get(status_handler::<D, L>),
        )
        .with_state(service)
}

pub(crate) async fn terms_handler<D, L>(
    State(service): State<Arc<LoanApplicationService<D, L>>>,
) -> Response
where
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    match service.terms() {
        Ok(terms) => (StatusCode::OK, Json(LoanTermsView::from_terms(terms))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn quote_handler<D, L>(
    State(service): State<Arc<LoanApplicationService<D, L>>>,
    Json(request): Json<QuoteRequest>,
) -> Response
where
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    match service.quote_with_terms(request, Utc::now()) {
        Ok((terms, quote)) => {
            let view = LoanQuoteView {
                due_date_display: format_due_date(quote.due_date),
                total_repayable_display: format_amount(&terms.base_currency, quote.total_repayable),
                quote,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<D, L>(
    State(service): State<Arc<LoanApplicationService<D, L>>>,
    Json(request): Json<QuoteRequest>,
) -> Response
where
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    match service.submit(request, Utc::now()) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<D, L>(
    State(service): State<Arc<LoanApplicationService<D, L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    match service.get(&LoanApplicationId(application_id)) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: LoanServiceError) -> Response {
    (err.status_code(), Json(json!({ "error": err.to_string() }))).into_response()
}
