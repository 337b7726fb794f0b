use super::domain::{InterestTierTable, LoanQuote, QuoteInput, DAYS_PER_MONTH, ELIGIBILITY_THRESHOLD};
use chrono::{DateTime, Duration, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Derive the repayment quote for a validated request.
///
/// The principal is clamped into `[min_loan_amount, max_approval_limit]`, the
/// rate comes from the first tier the score meets, and interest is prorated by
/// `duration_days / 30` with a single rounding step at the end. Borrowers below
/// the eligibility threshold still get advisory figures, but the returned
/// `max_approval_limit` is zero and `eligible` is false.
pub fn compute_quote(
    input: &QuoteInput,
    tiers: &InterestTierTable,
    issued_at: DateTime<Utc>,
) -> LoanQuote {
    let principal = input
        .principal()
        .clamp(input.min_loan_amount(), input.max_approval_limit());

    let tier = tiers.tier_for(input.reputation_score());
    let rate = tier.monthly_rate_pct;

    let months = f64::from(input.duration_days()) / DAYS_PER_MONTH;
    let interest_amount = ((principal as f64) * (rate / 100.0) * months).round() as u64;

    let eligible = input.reputation_score() >= ELIGIBILITY_THRESHOLD;
    let max_approval_limit = if eligible {
        input.max_approval_limit()
    } else {
        0
    };

    LoanQuote {
        principal,
        duration_days: input.duration_days(),
        reputation_score: input.reputation_score(),
        tier_label: tier.label.clone(),
        interest_rate_monthly: rate,
        interest_amount,
        total_repayable: principal.saturating_add(interest_amount),
        due_date: due_date(issued_at, input.duration_days()),
        eligible,
        max_approval_limit,
    }
}

/// Saturates at the latest representable instant instead of overflowing.
pub fn due_date(issued_at: DateTime<Utc>, duration_days: u32) -> DateTime<Utc> {
    issued_at
        .checked_add_signed(Duration::seconds(
            i64::from(duration_days) * SECONDS_PER_DAY,
        ))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Display form used on receipts, e.g. `05 Nov 2026`.
pub fn format_due_date(due: DateTime<Utc>) -> String {
    due.format("%d %b %Y").to_string()
}

/// Amount with Indian digit grouping, e.g. `₹1,25,000`.
pub fn format_amount(currency: &str, amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("{currency}{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{currency}{},{tail}", groups.join(","))
}
