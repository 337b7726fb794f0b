use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

use crate::tasks::{Task, TaskStatus};

#[derive(Debug)]
pub enum TaskImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for TaskImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskImportError::Io(err) => write!(f, "failed to read task export: {}", err),
            TaskImportError::Csv(err) => write!(f, "invalid task CSV data: {}", err),
            TaskImportError::InvalidRow { line, reason } => {
                write!(f, "task export line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for TaskImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskImportError::Io(err) => Some(err),
            TaskImportError::Csv(err) => Some(err),
            TaskImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for TaskImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TaskImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads task exports with the columns
/// `Task ID,Title,Platform,Category,Status,Hours Estimated,Hours Logged,Payout USD,Progress,Rating,Due Date`.
pub struct CsvTaskImporter;

impl CsvTaskImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Task>, TaskImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Task>, TaskImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut tasks = Vec::new();

        // Line 1 is the header row.
        for (index, record) in csv_reader.deserialize::<TaskRow>().enumerate() {
            let row = record?;
            tasks.push(row.into_task(index as u64 + 2)?);
        }

        Ok(tasks)
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    #[serde(rename = "Task ID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Platform", default)]
    platform: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Hours Estimated", default)]
    hours_estimated: f32,
    #[serde(rename = "Hours Logged", default)]
    hours_logged: f32,
    #[serde(rename = "Payout USD", default)]
    payout_usd: f32,
    #[serde(rename = "Progress", default)]
    progress: u8,
    #[serde(
        rename = "Rating",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    rating: Option<String>,
    #[serde(
        rename = "Due Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    due_date: Option<String>,
}

impl TaskRow {
    fn into_task(self, line: u64) -> Result<Task, TaskImportError> {
        let invalid = |reason: String| TaskImportError::InvalidRow {
            line,
            reason: format!("task {}: {}", self.id, reason),
        };

        let status: TaskStatus = self
            .status
            .parse()
            .map_err(|err: crate::tasks::TaskError| invalid(err.to_string()))?;

        if self.progress > 100 {
            return Err(invalid(format!("progress {} exceeds 100", self.progress)));
        }

        let rating = self
            .rating
            .as_deref()
            .map(|raw| {
                raw.parse::<f32>()
                    .map_err(|_| invalid(format!("rating '{raw}' is not a number")))
            })
            .transpose()?;

        let due_date = self
            .due_date
            .as_deref()
            .map(|raw| {
                parse_date(raw).ok_or_else(|| invalid(format!("due date '{raw}' is not a date")))
            })
            .transpose()?;

        Ok(Task {
            id: self.id,
            title: self.title,
            platform: self.platform,
            category: self.category,
            status,
            hours_estimated: self.hours_estimated,
            hours_logged: self.hours_logged,
            payout_usd: self.payout_usd,
            progress: self.progress,
            rating,
            due_date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
