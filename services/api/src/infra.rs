use chrono::{DateTime, Utc};
use karma_passport::loans::{LedgerError, LoanApplicationId, LoanApplicationReceipt, LoanLedger};
use karma_passport::session::{Session, SessionId, SessionStore, SessionStoreError};
use karma_passport::tasks::TaskFilter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    fn poisoned() -> SessionStoreError {
        SessionStoreError::Unavailable("session store mutex poisoned".to_string())
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().map_err(|_| Self::poisoned())?;
        if guard.contains_key(&session.id) {
            return Err(SessionStoreError::Conflict);
        }
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let guard = self.sessions.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        let mut guard = self.sessions.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.remove(id).is_some())
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
        let mut guard = self.sessions.lock().map_err(|_| Self::poisoned())?;
        let before = guard.len();
        guard.retain(|_, session| session.is_active(now));
        Ok(before - guard.len())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanLedger {
    receipts: Arc<Mutex<HashMap<LoanApplicationId, LoanApplicationReceipt>>>,
}

impl InMemoryLoanLedger {
    fn poisoned() -> LedgerError {
        LedgerError::Unavailable("ledger mutex poisoned".to_string())
    }
}

impl LoanLedger for InMemoryLoanLedger {
    fn insert(
        &self,
        receipt: LoanApplicationReceipt,
    ) -> Result<LoanApplicationReceipt, LedgerError> {
        let mut guard = self.receipts.lock().map_err(|_| Self::poisoned())?;
        if guard.contains_key(&receipt.application_id) {
            return Err(LedgerError::Conflict);
        }
        guard.insert(receipt.application_id.clone(), receipt.clone());
        Ok(receipt)
    }

    fn fetch(&self, id: &LoanApplicationId) -> Result<Option<LoanApplicationReceipt>, LedgerError> {
        let guard = self.receipts.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.get(id).cloned())
    }
}

pub(crate) fn parse_task_filter(raw: &str) -> Result<TaskFilter, String> {
    raw.parse().map_err(|err: karma_passport::tasks::TaskError| err.to_string())
}

pub(crate) fn parse_score(raw: &str) -> Result<u8, String> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|score| *score <= 100)
        .ok_or_else(|| format!("'{raw}' is not a karma score between 0 and 100"))
}
