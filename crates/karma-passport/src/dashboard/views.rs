use serde::Serialize;

use crate::tasks::{summarize, workload_by_status, Task, TaskFilter, TaskSummary, WorkloadEntry};

#[derive(Debug, Clone, Serialize)]
pub struct TaskBoardView {
    pub filter: &'static str,
    pub caption: String,
    pub tasks: Vec<Task>,
    /// Summary and workload always cover every task, not only the filtered rows.
    pub summary: TaskSummary,
    pub workload: Vec<WorkloadEntry>,
}

impl TaskBoardView {
    pub fn build(tasks: &[Task], filter: TaskFilter) -> Self {
        Self {
            filter: match filter {
                TaskFilter::All => "all",
                TaskFilter::Status(status) => status.slug(),
            },
            caption: filter.caption(),
            tasks: filter.apply(tasks).into_iter().cloned().collect(),
            summary: summarize(tasks),
            workload: workload_by_status(tasks),
        }
    }
}
