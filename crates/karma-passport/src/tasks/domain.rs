use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Active,
    PendingReview,
    Completed,
    Rejected,
}

impl TaskStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Active,
            Self::PendingReview,
            Self::Completed,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::PendingReview => "Pending Review",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingReview => "pending-review",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Self::ordered()
            .into_iter()
            .find(|status| status.slug() == normalized)
            .ok_or_else(|| TaskError::UnknownStatus(value.trim().to_string()))
    }
}

/// Work item linked to the worker's passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub platform: String,
    pub category: String,
    pub status: TaskStatus,
    pub hours_estimated: f32,
    pub hours_logged: f32,
    pub payout_usd: f32,
    /// Completion percentage, 0-100.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Status filter applied to the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Status(TaskStatus),
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => task.status == status,
        }
    }

    pub fn apply<'a>(self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    pub fn caption(self) -> String {
        match self {
            Self::All => "All tasks linked to your Karma Passport".to_string(),
            Self::Status(status) => {
                format!("Showing {} tasks", status.slug().replace('-', " "))
            }
        }
    }
}

impl FromStr for TaskFilter {
    type Err = TaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") || value.trim().is_empty() {
            return Ok(Self::All);
        }
        value.parse().map(Self::Status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("unknown task status '{0}' (expected all, active, pending-review, completed, or rejected)")]
    UnknownStatus(String),
}
