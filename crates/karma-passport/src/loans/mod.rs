//! Reputation-backed micro-loans: interest tiers, quotes, and the apply flow.
//!
//! Quotes are pure and recomputed on every request. Accepted applications are
//! kept in a [`LoanLedger`] supplied by the host.

pub mod application;
pub mod domain;
pub mod quote;
pub mod router;

#[cfg(test)]
mod tests;

pub use application::{
    check_can_apply, ApplyBlocked, LedgerError, LoanApplicationId, LoanApplicationReceipt,
    LoanApplicationService, LoanApplicationStatus, LoanLedger, LoanServiceError,
};
pub use domain::{
    InterestTier, InterestTierTable, LoanQuote, LoanTerms, QuoteError, QuoteInput, QuoteRequest,
    ELIGIBILITY_THRESHOLD,
};
pub use quote::{compute_quote, format_amount, format_due_date};
pub use router::loan_router;
