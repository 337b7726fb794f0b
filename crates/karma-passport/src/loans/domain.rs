use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum karma score a borrower needs before the apply action unlocks.
pub const ELIGIBILITY_THRESHOLD: u8 = 70;

/// Days treated as one month when prorating the monthly rate.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Longest duration the calculator accepts, whatever the terms advertise.
pub const MAX_DURATION_DAYS: u32 = 3_650;

/// Largest approval limit the calculator accepts.
pub const MAX_APPROVAL_LIMIT: u64 = 1_000_000_000_000;

/// One bracket of the interest table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestTier {
    pub label: String,
    pub min_score: u8,
    pub monthly_rate_pct: f64,
}

/// Score thresholds mapped to monthly rates, evaluated highest threshold first.
///
/// The table always carries a floor tier at threshold 0, so every score in
/// `0..=100` resolves to a rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<InterestTier>", into = "Vec<InterestTier>")]
pub struct InterestTierTable {
    /// Tiers above the floor, sorted by descending `min_score`.
    tiers: Vec<InterestTier>,
    floor: InterestTier,
}

impl InterestTierTable {
    pub fn new(mut tiers: Vec<InterestTier>) -> Result<Self, QuoteError> {
        if let Some(bad) = tiers
            .iter()
            .find(|tier| !tier.monthly_rate_pct.is_finite() || tier.monthly_rate_pct < 0.0)
        {
            return Err(QuoteError::InvalidTierRate {
                label: bad.label.clone(),
            });
        }

        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));
        tiers.dedup_by_key(|tier| tier.min_score);

        let floor = match tiers.pop() {
            Some(tier) if tier.min_score == 0 => tier,
            _ => return Err(QuoteError::MissingFloorTier),
        };

        Ok(Self { tiers, floor })
    }

    /// Gold/Silver/Bronze brackets used by the demo data.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                InterestTier {
                    label: "Gold".to_string(),
                    min_score: 80,
                    monthly_rate_pct: 2.0,
                },
                InterestTier {
                    label: "Silver".to_string(),
                    min_score: ELIGIBILITY_THRESHOLD,
                    monthly_rate_pct: 3.0,
                },
            ],
            floor: InterestTier {
                label: "Bronze".to_string(),
                min_score: 0,
                monthly_rate_pct: 5.0,
            },
        }
    }

    /// First tier whose threshold the score meets, scanning from the top.
    pub fn tier_for(&self, score: u8) -> &InterestTier {
        self.tiers
            .iter()
            .find(|tier| score >= tier.min_score)
            .unwrap_or(&self.floor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterestTier> {
        self.tiers.iter().chain(std::iter::once(&self.floor))
    }
}

impl TryFrom<Vec<InterestTier>> for InterestTierTable {
    type Error = QuoteError;

    fn try_from(value: Vec<InterestTier>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InterestTierTable> for Vec<InterestTier> {
    fn from(value: InterestTierTable) -> Self {
        let mut tiers = value.tiers;
        tiers.push(value.floor);
        tiers
    }
}

/// Lending terms offered to the signed-in borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub tier: String,
    pub karma_score: u8,
    pub base_currency: String,
    pub max_approval_limit: u64,
    pub min_loan_amount: u64,
    pub recommended_amount: u64,
    pub available_durations: Vec<u32>,
    pub interest_tiers: InterestTierTable,
    pub active_loans_count: u32,
    pub max_active_loans_allowed: u32,
}

impl LoanTerms {
    pub fn is_eligible(&self) -> bool {
        self.karma_score >= ELIGIBILITY_THRESHOLD
    }

    /// Limit the borrower can actually draw; zero below the eligibility threshold.
    pub fn effective_limit(&self) -> u64 {
        if self.is_eligible() {
            self.max_approval_limit
        } else {
            0
        }
    }

    pub fn has_active_loan_capacity(&self) -> bool {
        self.active_loans_count < self.max_active_loans_allowed
    }
}

/// Raw quote inputs as they arrive from a form or API payload.
///
/// Signed integers so negative amounts reach validation instead of failing
/// deserialization with an opaque message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub principal: i64,
    pub duration_days: i64,
    /// Falls back to the score on the loan terms when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_score: Option<i64>,
}

impl QuoteRequest {
    /// Boundary validation; the calculator itself never fails.
    pub fn validate(&self, terms: &LoanTerms) -> Result<QuoteInput, QuoteError> {
        check_limits(terms.min_loan_amount, terms.max_approval_limit)?;

        let principal =
            u64::try_from(self.principal).map_err(|_| QuoteError::NegativePrincipal {
                principal: self.principal,
            })?;

        let duration_days = u32::try_from(self.duration_days)
            .ok()
            .filter(|days| (1..=MAX_DURATION_DAYS).contains(days))
            .filter(|days| terms.available_durations.contains(days))
            .ok_or_else(|| QuoteError::UnsupportedDuration {
                duration_days: self.duration_days,
                allowed: terms.available_durations.clone(),
            })?;

        let raw_score = self
            .reputation_score
            .unwrap_or_else(|| i64::from(terms.karma_score));
        let reputation_score = u8::try_from(raw_score)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or(QuoteError::ScoreOutOfRange { score: raw_score })?;

        Ok(QuoteInput {
            principal,
            duration_days,
            reputation_score,
            min_loan_amount: terms.min_loan_amount,
            max_approval_limit: terms.max_approval_limit,
        })
    }
}

/// Validated calculator inputs. Only constructed through [`QuoteRequest::validate`]
/// or [`QuoteInput::new`], so `min_loan_amount <= max_approval_limit <= MAX_APPROVAL_LIMIT`
/// and `1 <= duration_days <= MAX_DURATION_DAYS` hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteInput {
    principal: u64,
    duration_days: u32,
    reputation_score: u8,
    min_loan_amount: u64,
    max_approval_limit: u64,
}

impl QuoteInput {
    pub fn new(
        principal: u64,
        duration_days: u32,
        reputation_score: u8,
        min_loan_amount: u64,
        max_approval_limit: u64,
    ) -> Result<Self, QuoteError> {
        check_limits(min_loan_amount, max_approval_limit)?;
        if reputation_score > 100 {
            return Err(QuoteError::ScoreOutOfRange {
                score: i64::from(reputation_score),
            });
        }
        if !(1..=MAX_DURATION_DAYS).contains(&duration_days) {
            return Err(QuoteError::UnsupportedDuration {
                duration_days: i64::from(duration_days),
                allowed: Vec::new(),
            });
        }

        Ok(Self {
            principal,
            duration_days,
            reputation_score,
            min_loan_amount,
            max_approval_limit,
        })
    }

    pub fn principal(&self) -> u64 {
        self.principal
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn reputation_score(&self) -> u8 {
        self.reputation_score
    }

    pub fn min_loan_amount(&self) -> u64 {
        self.min_loan_amount
    }

    pub fn max_approval_limit(&self) -> u64 {
        self.max_approval_limit
    }
}

fn check_limits(min_loan_amount: u64, max_approval_limit: u64) -> Result<(), QuoteError> {
    if min_loan_amount > max_approval_limit {
        return Err(QuoteError::InvalidLoanTerms {
            min: min_loan_amount,
            max: max_approval_limit,
        });
    }
    if max_approval_limit > MAX_APPROVAL_LIMIT {
        return Err(QuoteError::ApprovalLimitTooLarge {
            limit: max_approval_limit,
            max: MAX_APPROVAL_LIMIT,
        });
    }
    Ok(())
}

/// Repayment figures for a prospective loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanQuote {
    pub principal: u64,
    pub duration_days: u32,
    pub reputation_score: u8,
    pub tier_label: String,
    pub interest_rate_monthly: f64,
    pub interest_amount: u64,
    pub total_repayable: u64,
    pub due_date: DateTime<Utc>,
    pub eligible: bool,
    pub max_approval_limit: u64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("loan amount must not be negative (got {principal})")]
    NegativePrincipal { principal: i64 },
    #[error("duration of {duration_days} days is not offered (allowed: {allowed:?})")]
    UnsupportedDuration {
        duration_days: i64,
        allowed: Vec<u32>,
    },
    #[error("reputation score {score} is outside 0-100")]
    ScoreOutOfRange { score: i64 },
    #[error("minimum loan amount {min} exceeds approval limit {max}")]
    InvalidLoanTerms { min: u64, max: u64 },
    #[error("approval limit {limit} exceeds the supported maximum of {max}")]
    ApprovalLimitTooLarge { limit: u64, max: u64 },
    #[error("interest tier table needs a tier starting at score 0")]
    MissingFloorTier,
    #[error("interest tier '{label}' has an invalid monthly rate")]
    InvalidTierRate { label: String },
}
