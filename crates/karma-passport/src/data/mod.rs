//! Data access for the dashboard pages.
//!
//! Presentation code only talks to [`DashboardDataSource`], so the mock
//! fixtures can be swapped for a real backend without touching handlers.

mod csv_import;
mod mock;

pub use csv_import::{CsvTaskImporter, TaskImportError};
pub use mock::MockDataSource;

use serde::{Deserialize, Serialize};

use crate::karma::{ActivityFeatures, RiskCategory};
use crate::loans::LoanTerms;
use crate::session::{SessionUser, UserRole};
use crate::tasks::Task;

pub trait DashboardDataSource: Send + Sync {
    fn fetch_user_profile(&self) -> Result<UserProfile, DataError>;
    fn fetch_tasks(&self) -> Result<Vec<Task>, DataError>;
    fn fetch_loan_terms(&self) -> Result<LoanTerms, DataError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Import(#[from] TaskImportError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KarmaSnapshot {
    pub score: u8,
    pub risk_category: RiskCategory,
    pub loan_limit_usd: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStats {
    pub total_tasks_completed: u32,
    pub total_earnings_usd: u32,
    pub active_streak: u32,
    pub avg_rating: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: ProfileUser,
    pub karma_score: KarmaSnapshot,
    pub work_stats: WorkStats,
    pub activity: ActivityFeatures,
}

impl UserProfile {
    /// Shows the signed-in identity on top of the stored profile data.
    pub fn for_session_user(mut self, user: &SessionUser) -> Self {
        self.user.name = user.name.clone();
        self.user.email = user.email.clone();
        self.user.role = user.role;
        self
    }
}
