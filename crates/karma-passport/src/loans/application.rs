use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{LoanQuote, LoanTerms, QuoteError, QuoteRequest, ELIGIBILITY_THRESHOLD};
use super::quote::{compute_quote, format_due_date};
use crate::data::{DashboardDataSource, DataError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanApplicationId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanApplicationStatus {
    Submitted,
}

impl LoanApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
        }
    }
}

/// Confirmation handed back once an application is accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanApplicationReceipt {
    pub application_id: LoanApplicationId,
    pub status: LoanApplicationStatus,
    pub base_currency: String,
    pub quote: LoanQuote,
    pub due_date_display: String,
    pub submitted_at: DateTime<Utc>,
}

/// Storage for accepted applications.
pub trait LoanLedger: Send + Sync {
    fn insert(&self, receipt: LoanApplicationReceipt)
        -> Result<LoanApplicationReceipt, LedgerError>;
    fn fetch(&self, id: &LoanApplicationId) -> Result<Option<LoanApplicationReceipt>, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("application already recorded")]
    Conflict,
    #[error("application not found")]
    NotFound,
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Why the apply action is blocked for the current borrower.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyBlocked {
    #[error("karma score {score} is below the required {required}")]
    NotEligible { score: u8, required: u8 },
    #[error("maximum active loans reached ({active}/{allowed}); repay an existing loan first")]
    ActiveLoanLimitReached { active: u32, allowed: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Blocked(#[from] ApplyBlocked),
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl LoanServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Blocked(ApplyBlocked::NotEligible { .. }) => StatusCode::FORBIDDEN,
            Self::Blocked(ApplyBlocked::ActiveLoanLimitReached { .. })
            | Self::Ledger(LedgerError::Conflict) => StatusCode::CONFLICT,
            Self::Quote(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ledger(LedgerError::NotFound) => StatusCode::NOT_FOUND,
            Self::Data(_) | Self::Ledger(LedgerError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> LoanApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LoanApplicationId(format!("loan-{id:06}"))
}

/// Checks the apply action against the borrower's terms.
pub fn check_can_apply(terms: &LoanTerms) -> Result<(), ApplyBlocked> {
    if !terms.is_eligible() {
        return Err(ApplyBlocked::NotEligible {
            score: terms.karma_score,
            required: ELIGIBILITY_THRESHOLD,
        });
    }
    if !terms.has_active_loan_capacity() {
        return Err(ApplyBlocked::ActiveLoanLimitReached {
            active: terms.active_loans_count,
            allowed: terms.max_active_loans_allowed,
        });
    }
    Ok(())
}

/// Service composing the data source, quote calculator, and ledger.
pub struct LoanApplicationService<D, L> {
    data: Arc<D>,
    ledger: Arc<L>,
}

impl<D, L> LoanApplicationService<D, L>
where
    D: DashboardDataSource + 'static,
    L: LoanLedger + 'static,
{
    pub fn new(data: Arc<D>, ledger: Arc<L>) -> Self {
        Self { data, ledger }
    }

    pub fn terms(&self) -> Result<LoanTerms, LoanServiceError> {
        Ok(self.data.fetch_loan_terms()?)
    }

    /// Advisory quote; available even when the apply action is blocked.
    pub fn quote(
        &self,
        request: QuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<LoanQuote, LoanServiceError> {
        self.quote_with_terms(request, now).map(|(_, quote)| quote)
    }

    /// Same as [`Self::quote`], also handing back the terms it was priced against.
    pub fn quote_with_terms(
        &self,
        request: QuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<(LoanTerms, LoanQuote), LoanServiceError> {
        let terms = self.terms()?;
        let input = request.validate(&terms)?;
        let quote = compute_quote(&input, &terms.interest_tiers, now);
        debug!(
            principal = quote.principal,
            duration_days = quote.duration_days,
            tier = %quote.tier_label,
            "computed loan quote"
        );
        Ok((terms, quote))
    }

    /// Gate for opening the application form.
    pub fn start(&self) -> Result<LoanTerms, LoanServiceError> {
        let terms = self.terms()?;
        check_can_apply(&terms)?;
        Ok(terms)
    }

    pub fn submit(
        &self,
        request: QuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<LoanApplicationReceipt, LoanServiceError> {
        let terms = self.terms()?;
        if let Err(blocked) = check_can_apply(&terms) {
            warn!(reason = %blocked, "loan application blocked");
            return Err(blocked.into());
        }

        // Submissions always use the borrower's own score.
        let request = QuoteRequest {
            reputation_score: None,
            ..request
        };
        let input = request.validate(&terms)?;
        let quote = compute_quote(&input, &terms.interest_tiers, now);

        let receipt = LoanApplicationReceipt {
            application_id: next_application_id(),
            status: LoanApplicationStatus::Submitted,
            base_currency: terms.base_currency.clone(),
            due_date_display: format_due_date(quote.due_date),
            quote,
            submitted_at: now,
        };

        let stored = self.ledger.insert(receipt)?;
        info!(
            application_id = %stored.application_id.0,
            principal = stored.quote.principal,
            total_repayable = stored.quote.total_repayable,
            "loan application submitted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &LoanApplicationId) -> Result<LoanApplicationReceipt, LoanServiceError> {
        let receipt = self.ledger.fetch(id)?.ok_or(LedgerError::NotFound)?;
        Ok(receipt)
    }
}
