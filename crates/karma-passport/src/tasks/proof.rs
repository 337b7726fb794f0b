use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_RATING: f32 = 5.0;

/// Delivery proof as entered in the "Log Delivery Proof" form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryProofForm {
    #[serde(default = "default_platform")]
    pub platform: String,
    pub number_of_tasks: u32,
    pub average_rating: f32,
    pub total_hours: u32,
    #[serde(default)]
    pub shift_details: String,
    pub description: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
}

fn default_platform() -> String {
    "Upwork".to_string()
}

/// Proofs leave this crate pending; verification is outside the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofStatus {
    Pending,
}

/// Accepted submission awaiting verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryProof {
    pub id: String,
    pub title: String,
    pub description: String,
    pub platform: String,
    pub number_of_tasks: u32,
    pub total_hours: u32,
    pub average_rating: f32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub shift_details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: ProofStatus,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProofError {
    #[error("description of the completed work is required")]
    MissingDescription,
    #[error("platform is required")]
    MissingPlatform,
    #[error("number of tasks must be at least 1")]
    NoTasks,
    #[error("average rating must be between 0 and 5 (got {0})")]
    RatingOutOfRange(f32),
    #[error("proof link must be an http(s) URL")]
    InvalidAttachmentUrl,
}

impl DeliveryProofForm {
    pub fn accept(self, now: DateTime<Utc>) -> Result<DeliveryProof, ProofError> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(ProofError::MissingDescription);
        }
        let platform = self.platform.trim().to_string();
        if platform.is_empty() {
            return Err(ProofError::MissingPlatform);
        }
        if self.number_of_tasks == 0 {
            return Err(ProofError::NoTasks);
        }
        if !(0.0..=MAX_RATING).contains(&self.average_rating) {
            return Err(ProofError::RatingOutOfRange(self.average_rating));
        }

        let attachment_url = match self.attachment_url.map(|url| url.trim().to_string()) {
            Some(url) if url.is_empty() => None,
            Some(url) if url.starts_with("https://") || url.starts_with("http://") => Some(url),
            Some(_) => return Err(ProofError::InvalidAttachmentUrl),
            None => None,
        };

        let title = description
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(DeliveryProof {
            id: format!("PROOF-{}", now.timestamp_millis()),
            title,
            description,
            platform,
            number_of_tasks: self.number_of_tasks,
            total_hours: self.total_hours,
            average_rating: self.average_rating,
            shift_details: self.shift_details.trim().to_string(),
            attachment_url,
            submitted_at: now,
            status: ProofStatus::Pending,
        })
    }
}
