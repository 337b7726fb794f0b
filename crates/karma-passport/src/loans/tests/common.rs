use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::data::{DashboardDataSource, DataError, MockDataSource, UserProfile};
use crate::loans::{
    loan_router, LedgerError, LoanApplicationId, LoanApplicationReceipt, LoanApplicationService,
    LoanLedger, LoanTerms, QuoteRequest,
};
use crate::tasks::Task;

pub(super) fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn request(principal: i64, duration_days: i64) -> QuoteRequest {
    QuoteRequest {
        principal,
        duration_days,
        reputation_score: None,
    }
}

pub(super) fn terms_with(score: u8, active: u32) -> LoanTerms {
    let mut terms = MockDataSource::default()
        .fetch_loan_terms()
        .expect("demo terms");
    terms.karma_score = score;
    terms.active_loans_count = active;
    terms
}

pub(super) fn data_with_terms(terms: LoanTerms) -> Arc<MockDataSource> {
    Arc::new(MockDataSource::default().with_terms(terms))
}

pub(super) fn build_service() -> (
    LoanApplicationService<MockDataSource, MemoryLedger>,
    Arc<MemoryLedger>,
) {
    let ledger = Arc::new(MemoryLedger::default());
    let service = LoanApplicationService::new(Arc::new(MockDataSource::default()), ledger.clone());
    (service, ledger)
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    pub(super) receipts: Arc<Mutex<HashMap<LoanApplicationId, LoanApplicationReceipt>>>,
}

impl MemoryLedger {
    pub(super) fn len(&self) -> usize {
        self.receipts.lock().expect("ledger mutex poisoned").len()
    }
}

impl LoanLedger for MemoryLedger {
    fn insert(
        &self,
        receipt: LoanApplicationReceipt,
    ) -> Result<LoanApplicationReceipt, LedgerError> {
        let mut guard = self.receipts.lock().expect("ledger mutex poisoned");
        if guard.contains_key(&receipt.application_id) {
            return Err(LedgerError::Conflict);
        }
        guard.insert(receipt.application_id.clone(), receipt.clone());
        Ok(receipt)
    }

    fn fetch(&self, id: &LoanApplicationId) -> Result<Option<LoanApplicationReceipt>, LedgerError> {
        let guard = self.receipts.lock().expect("ledger mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct ConflictLedger;

impl LoanLedger for ConflictLedger {
    fn insert(
        &self,
        _receipt: LoanApplicationReceipt,
    ) -> Result<LoanApplicationReceipt, LedgerError> {
        Err(LedgerError::Conflict)
    }

    fn fetch(
        &self,
        _id: &LoanApplicationId,
    ) -> Result<Option<LoanApplicationReceipt>, LedgerError> {
        Ok(None)
    }
}

pub(super) struct UnavailableLedger;

impl LoanLedger for UnavailableLedger {
    fn insert(
        &self,
        _receipt: LoanApplicationReceipt,
    ) -> Result<LoanApplicationReceipt, LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }

    fn fetch(
        &self,
        _id: &LoanApplicationId,
    ) -> Result<Option<LoanApplicationReceipt>, LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }
}

pub(super) struct OfflineData;

impl DashboardDataSource for OfflineData {
    fn fetch_user_profile(&self) -> Result<UserProfile, DataError> {
        Err(DataError::Unavailable("profile service offline".to_string()))
    }

    fn fetch_tasks(&self) -> Result<Vec<Task>, DataError> {
        Err(DataError::Unavailable("task service offline".to_string()))
    }

    fn fetch_loan_terms(&self) -> Result<LoanTerms, DataError> {
        Err(DataError::Unavailable("loan service offline".to_string()))
    }
}

pub(super) fn router_with_service<L: LoanLedger + 'static>(
    service: LoanApplicationService<MockDataSource, L>,
) -> axum::Router {
    loan_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
