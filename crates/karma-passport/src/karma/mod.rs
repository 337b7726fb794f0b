//! Dashboard figures derived from a karma score and the worker's activity.
//!
//! The score itself is supplied by the data source; nothing here predicts it.

use serde::{Deserialize, Serialize};

/// Raw activity signals collected for a worker.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFeatures {
    /// Tasks per month, nominally 0-20.
    pub work_frequency: f64,
    /// Fraction of tasks accepted, 0-1.
    pub task_success_rate: f64,
    pub verified_hours_worked: f64,
    /// Months since the passport was created.
    pub profile_age: f64,
    /// 0-100.
    pub platform_activity_score: f64,
    pub task_variety: f64,
    /// Loans repaid on time, nominally 0-20.
    pub repayment_history: f64,
    /// Defaults, nominally 0-10.
    pub default_history: f64,
    pub company_rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Self::Low
        } else if score >= 50.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }
}

/// Score in `0..=100` mapped linearly onto a `0..=1000` USD limit.
pub fn loan_limit_usd(score: f64) -> u32 {
    (score * 10.0).clamp(0.0, 1000.0) as u32
}

/// Per-agent percentages shown on the dashboard, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentScores {
    pub work_frequency_agent: f64,
    pub task_success_rate_agent: f64,
    pub repayment_history_agent: f64,
    pub activity_agent: f64,
}

impl AgentScores {
    pub fn from_features(features: &ActivityFeatures) -> Self {
        let work_frequency = features.work_frequency / 20.0 * 100.0;
        let task_success = features.task_success_rate * 100.0;
        let repayment =
            (features.repayment_history - features.default_history + 10.0) / 20.0 * 100.0;

        Self {
            work_frequency_agent: percent(work_frequency),
            task_success_rate_agent: percent(task_success),
            repayment_history_agent: percent(repayment),
            activity_agent: percent(features.platform_activity_score),
        }
    }
}

fn percent(value: f64) -> f64 {
    round_to(value.clamp(0.0, 100.0), 1)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Headline cards for the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryCards {
    pub tasks_completed: u32,
    pub total_earnings: f64,
    pub active_streak_days: u32,
    pub average_rating: f64,
}

impl SummaryCards {
    const EARNINGS_PER_TASK: f64 = 75.0;

    pub fn from_features(features: &ActivityFeatures) -> Self {
        let tasks_completed = (features.work_frequency * 3.0).max(0.0) as u32;
        Self {
            tasks_completed,
            total_earnings: round_to(f64::from(tasks_completed) * Self::EARNINGS_PER_TASK, 2),
            active_streak_days: (features.profile_age.max(0.0) as u32).max(1),
            average_rating: features.company_rating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KarmaInsights {
    pub karma_score: f64,
    pub risk_category: RiskCategory,
    pub risk_label: &'static str,
    pub loan_limit: u32,
    pub agent_scores: AgentScores,
    pub summary: SummaryCards,
}

impl KarmaInsights {
    pub fn derive(score: f64, features: &ActivityFeatures) -> Self {
        let risk_category = RiskCategory::from_score(score);
        Self {
            karma_score: round_to(score, 2),
            risk_category,
            risk_label: risk_category.label(),
            loan_limit: loan_limit_usd(score),
            agent_scores: AgentScores::from_features(features),
            summary: SummaryCards::from_features(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> ActivityFeatures {
        ActivityFeatures {
            work_frequency: 12.0,
            task_success_rate: 0.92,
            verified_hours_worked: 160.0,
            profile_age: 14.0,
            platform_activity_score: 45.0,
            task_variety: 18.0,
            repayment_history: 10.0,
            default_history: 0.0,
            company_rating: 4.8,
        }
    }

    #[test]
    fn risk_bands_follow_thresholds() {
        assert_eq!(RiskCategory::from_score(75.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(74.9), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(50.0), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(49.99), RiskCategory::High);
    }

    #[test]
    fn loan_limit_scales_and_clamps() {
        assert_eq!(loan_limit_usd(85.4), 854);
        assert_eq!(loan_limit_usd(-3.0), 0);
        assert_eq!(loan_limit_usd(140.0), 1000);
    }

    #[test]
    fn agent_scores_normalise_features() {
        let scores = AgentScores::from_features(&features());
        assert_eq!(scores.work_frequency_agent, 60.0);
        assert_eq!(scores.task_success_rate_agent, 92.0);
        assert_eq!(scores.repayment_history_agent, 100.0);
        assert_eq!(scores.activity_agent, 45.0);
    }

    #[test]
    fn repayment_agent_drops_with_defaults() {
        let mut risky = features();
        risky.repayment_history = 2.0;
        risky.default_history = 6.0;
        let scores = AgentScores::from_features(&risky);
        assert_eq!(scores.repayment_history_agent, 30.0);
    }

    #[test]
    fn insights_bundle_summary_cards() {
        let insights = KarmaInsights::derive(85.0, &features());
        assert_eq!(insights.risk_category, RiskCategory::Low);
        assert_eq!(insights.risk_label, "Low Risk");
        assert_eq!(insights.loan_limit, 850);
        assert_eq!(insights.summary.tasks_completed, 36);
        assert_eq!(insights.summary.total_earnings, 2700.0);
        assert_eq!(insights.summary.active_streak_days, 14);
        assert_eq!(insights.summary.average_rating, 4.8);
    }

    #[test]
    fn new_profiles_keep_a_one_day_streak() {
        let cards = SummaryCards::from_features(&ActivityFeatures::default());
        assert_eq!(cards.active_streak_days, 1);
        assert_eq!(cards.tasks_completed, 0);
    }
}
