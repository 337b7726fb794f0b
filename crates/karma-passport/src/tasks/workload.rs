use super::domain::{Task, TaskStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadEntry {
    pub status: TaskStatus,
    pub status_label: &'static str,
    pub count: usize,
    /// Share of all tasks, rounded to a whole percent; 0 when there are no tasks.
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub total_tasks: usize,
    pub active_tasks: usize,
    pub pending_review: usize,
    pub completed_tasks: usize,
    pub rejected_tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_task_rating: Option<f32>,
    pub hours_logged: f32,
    pub payout_completed_usd: f32,
}

pub fn workload_by_status(tasks: &[Task]) -> Vec<WorkloadEntry> {
    let total = tasks.len();
    TaskStatus::ordered()
        .into_iter()
        .map(|status| {
            let count = tasks.iter().filter(|task| task.status == status).count();
            WorkloadEntry {
                status,
                status_label: status.label(),
                count,
                percent: percent_of(count, total),
            }
        })
        .collect()
}

fn percent_of(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u8
}

pub fn summarize(tasks: &[Task]) -> TaskSummary {
    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();

    let ratings: Vec<f32> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .filter_map(|task| task.rating)
        .collect();
    let avg_task_rating = if ratings.is_empty() {
        None
    } else {
        let mean = ratings.iter().sum::<f32>() / ratings.len() as f32;
        Some((mean * 10.0).round() / 10.0)
    };

    TaskSummary {
        total_tasks: tasks.len(),
        active_tasks: count(TaskStatus::Active),
        pending_review: count(TaskStatus::PendingReview),
        completed_tasks: count(TaskStatus::Completed),
        rejected_tasks: count(TaskStatus::Rejected),
        avg_task_rating,
        hours_logged: tasks.iter().map(|task| task.hours_logged).sum(),
        payout_completed_usd: tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Completed)
            .map(|task| task.payout_usd)
            .sum(),
    }
}
