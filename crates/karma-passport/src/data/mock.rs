use chrono::NaiveDate;
use std::path::Path;

use super::{
    CsvTaskImporter, DashboardDataSource, DataError, KarmaSnapshot, ProfileUser, UserProfile,
    WorkStats,
};
use crate::karma::{loan_limit_usd, ActivityFeatures, RiskCategory};
use crate::loans::{InterestTierTable, LoanTerms};
use crate::session::UserRole;
use crate::tasks::{Task, TaskStatus};

/// Fixed demo data backing every dashboard page.
#[derive(Debug, Clone)]
pub struct MockDataSource {
    profile: UserProfile,
    tasks: Vec<Task>,
    terms: LoanTerms,
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self {
            profile: demo_profile(),
            tasks: demo_tasks(),
            terms: demo_terms(),
        }
    }
}

impl MockDataSource {
    pub fn new(profile: UserProfile, tasks: Vec<Task>, terms: LoanTerms) -> Self {
        Self {
            profile,
            tasks,
            terms,
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_terms(mut self, terms: LoanTerms) -> Self {
        self.terms = terms;
        self
    }

    /// Demo profile and terms with tasks loaded from a CSV export.
    pub fn from_task_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let tasks = CsvTaskImporter::from_path(path)?;
        Ok(Self::default().with_tasks(tasks))
    }
}

impl DashboardDataSource for MockDataSource {
    fn fetch_user_profile(&self) -> Result<UserProfile, DataError> {
        Ok(self.profile.clone())
    }

    fn fetch_tasks(&self) -> Result<Vec<Task>, DataError> {
        Ok(self.tasks.clone())
    }

    fn fetch_loan_terms(&self) -> Result<LoanTerms, DataError> {
        Ok(self.terms.clone())
    }
}

const DEMO_SCORE: u8 = 85;

fn demo_profile() -> UserProfile {
    UserProfile {
        user: ProfileUser {
            id: "worker-001".to_string(),
            name: "Priya Nair".to_string(),
            email: "priya.nair@karmapassport.dev".to_string(),
            role: UserRole::Worker,
            avatar_url: Some("https://api.dicebear.com/7.x/initials/svg?seed=PN".to_string()),
        },
        karma_score: KarmaSnapshot {
            score: DEMO_SCORE,
            risk_category: RiskCategory::from_score(f64::from(DEMO_SCORE)),
            loan_limit_usd: loan_limit_usd(f64::from(DEMO_SCORE)),
        },
        work_stats: WorkStats {
            total_tasks_completed: 142,
            total_earnings_usd: 8_640,
            active_streak: 14,
            avg_rating: 4.8,
        },
        activity: ActivityFeatures {
            work_frequency: 12.0,
            task_success_rate: 0.92,
            verified_hours_worked: 160.0,
            profile_age: 14.0,
            platform_activity_score: 45.0,
            task_variety: 18.0,
            repayment_history: 10.0,
            default_history: 0.0,
            company_rating: 4.8,
        },
    }
}

fn demo_terms() -> LoanTerms {
    LoanTerms {
        tier: "Gold".to_string(),
        karma_score: DEMO_SCORE,
        base_currency: "₹".to_string(),
        max_approval_limit: 10_000,
        min_loan_amount: 500,
        recommended_amount: 5_000,
        available_durations: vec![7, 14, 30, 60, 90],
        interest_tiers: InterestTierTable::standard(),
        active_loans_count: 1,
        max_active_loans_allowed: 3,
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_task(
    id: &str,
    title: &str,
    platform: &str,
    category: &str,
    status: TaskStatus,
    hours: (f32, f32),
    payout_usd: f32,
    progress: u8,
    rating: Option<f32>,
    due: (i32, u32, u32),
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        platform: platform.to_string(),
        category: category.to_string(),
        status,
        hours_estimated: hours.0,
        hours_logged: hours.1,
        payout_usd,
        progress,
        rating,
        due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
    }
}

fn demo_tasks() -> Vec<Task> {
    vec![
        demo_task(
            "TASK-1042",
            "Landing page redesign",
            "Upwork",
            "Design",
            TaskStatus::Active,
            (24.0, 15.5),
            420.0,
            65,
            None,
            (2026, 10, 22),
        ),
        demo_task(
            "TASK-1039",
            "REST API integration for invoices",
            "GitHub",
            "Development",
            TaskStatus::PendingReview,
            (16.0, 16.0),
            380.0,
            100,
            None,
            (2026, 10, 18),
        ),
        demo_task(
            "TASK-1031",
            "Product catalogue data entry",
            "Fiverr",
            "Data Entry",
            TaskStatus::Completed,
            (10.0, 9.0),
            120.0,
            100,
            Some(4.9),
            (2026, 10, 9),
        ),
        demo_task(
            "TASK-1027",
            "Mobile onboarding screens",
            "Upwork",
            "Design",
            TaskStatus::Completed,
            (18.0, 20.5),
            350.0,
            100,
            Some(4.7),
            (2026, 10, 3),
        ),
        demo_task(
            "TASK-1019",
            "Customer support shift (night)",
            "Direct Client",
            "Support",
            TaskStatus::Rejected,
            (8.0, 8.0),
            60.0,
            100,
            Some(3.2),
            (2026, 9, 27),
        ),
        demo_task(
            "TASK-1045",
            "Blog series: gig worker finance",
            "Fiverr",
            "Writing",
            TaskStatus::Active,
            (12.0, 3.0),
            150.0,
            25,
            None,
            (2026, 10, 28),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loans::check_can_apply;

    #[test]
    fn demo_terms_are_eligible_with_capacity() {
        let source = MockDataSource::default();
        let terms = source.fetch_loan_terms().expect("terms available");
        assert!(terms.is_eligible());
        assert!(check_can_apply(&terms).is_ok());
        assert!(terms.available_durations.contains(&30));
    }

    #[test]
    fn demo_profile_matches_loan_score() {
        let source = MockDataSource::default();
        let profile = source.fetch_user_profile().expect("profile available");
        let terms = source.fetch_loan_terms().expect("terms available");
        assert_eq!(profile.karma_score.score, terms.karma_score);
        assert_eq!(profile.karma_score.risk_category, RiskCategory::Low);
        assert_eq!(profile.karma_score.loan_limit_usd, 850);
    }

    #[test]
    fn tasks_can_be_replaced() {
        let source = MockDataSource::default().with_tasks(Vec::new());
        assert!(source.fetch_tasks().expect("tasks").is_empty());
    }
}
