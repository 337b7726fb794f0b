use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::data::{DashboardDataSource, DataError, MockDataSource, UserProfile};
use crate::loans::{loan_router, LoanApplicationService, LoanTerms};
use crate::tasks::Task;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct CountingData {
    inner: MockDataSource,
    terms_reads: AtomicUsize,
}

impl DashboardDataSource for CountingData {
    fn fetch_user_profile(&self) -> Result<UserProfile, DataError> {
        self.inner.fetch_user_profile()
    }

    fn fetch_tasks(&self) -> Result<Vec<Task>, DataError> {
        self.inner.fetch_tasks()
    }

    fn fetch_loan_terms(&self) -> Result<LoanTerms, DataError> {
        self.terms_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_loan_terms()
    }
}

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn terms_route_reports_effective_limit() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(
            Request::get("/api/v1/loans/terms")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["eligible"], true);
    assert_eq!(body["can_apply"], true);
    assert_eq!(body["effective_limit"], 10_000);
    assert_eq!(body["effective_limit_display"], "₹10,000");
    assert_eq!(body["karma_score"], 85);
}

#[tokio::test]
async fn terms_route_explains_blocked_apply() {
    let service = LoanApplicationService::new(
        data_with_terms(terms_with(60, 0)),
        Arc::new(MemoryLedger::default()),
    );
    let response = loan_router(Arc::new(service))
        .oneshot(
            Request::get("/api/v1/loans/terms")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let body = read_json_body(response).await;
    assert_eq!(body["eligible"], false);
    assert_eq!(body["effective_limit"], 0);
    assert_eq!(body["can_apply"], false);
    assert!(body["blocked_reason"]
        .as_str()
        .expect("reason")
        .contains("below the required 70"));
}

#[tokio::test]
async fn quote_route_returns_display_fields() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/loans/quote",
            json!({ "principal": 5000, "duration_days": 30, "reputation_score": 85 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["interest_amount"], 100);
    assert_eq!(body["total_repayable"], 5100);
    assert_eq!(body["total_repayable_display"], "₹5,100");
    assert!(body["due_date_display"].is_string());
}

#[tokio::test]
async fn quote_route_rejects_out_of_range_score() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post_json(
            "/api/v1/loans/quote",
            json!({ "principal": 5000, "duration_days": 30, "reputation_score": 140 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().expect("message").contains("140"));
}

#[tokio::test]
async fn submit_route_creates_and_serves_receipt() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/loans/applications",
            json!({ "principal": 2500, "duration_days": 14 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "submitted");
    let id = body["application_id"]
        .as_str()
        .expect("application id")
        .to_string();

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/loans/applications/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["application_id"], id.as_str());
    assert_eq!(body["quote"]["principal"], 2500);
}

#[tokio::test]
async fn submit_route_forbids_ineligible_borrowers() {
    let service = LoanApplicationService::new(
        data_with_terms(terms_with(60, 0)),
        Arc::new(MemoryLedger::default()),
    );
    let response = loan_router(Arc::new(service))
        .oneshot(post_json(
            "/api/v1/loans/applications",
            json!({ "principal": 1000, "duration_days": 30 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn submit_route_returns_conflict_when_active_loans_are_maxed() {
    let ledger = Arc::new(MemoryLedger::default());
    let service = LoanApplicationService::new(data_with_terms(terms_with(90, 3)), ledger.clone());
    let response = loan_router(Arc::new(service))
        .oneshot(post_json(
            "/api/v1/loans/applications",
            json!({ "principal": 1000, "duration_days": 30 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("message")
        .contains("active loans"));
    assert_eq!(ledger.len(), 0);
}

#[tokio::test]
async fn submit_route_returns_conflict_on_duplicate() {
    let service = LoanApplicationService::new(data_with_terms(terms_with(85, 0)), Arc::new(ConflictLedger));
    let response = loan_router(Arc::new(service))
        .oneshot(post_json(
            "/api/v1/loans/applications",
            json!({ "principal": 1000, "duration_days": 30 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn submit_route_returns_internal_error_on_ledger_failure() {
    let service = LoanApplicationService::new(
        data_with_terms(terms_with(85, 0)),
        Arc::new(UnavailableLedger),
    );
    let response = loan_router(Arc::new(service))
        .oneshot(post_json(
            "/api/v1/loans/applications",
            json!({ "principal": 1000, "duration_days": 30 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_id() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(
            Request::get("/api/v1/loans/applications/loan-424242")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_route_reads_terms_once() {
    let data = Arc::new(CountingData::default());
    let service = LoanApplicationService::new(data.clone(), Arc::new(MemoryLedger::default()));
    let response = loan_router(Arc::new(service))
        .oneshot(post_json(
            "/api/v1/loans/quote",
            json!({ "principal": 5000, "duration_days": 30 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_repayable_display"], "₹5,100");
    assert_eq!(data.terms_reads.load(Ordering::SeqCst), 1);
}
