//! Job entity models and DTOs for the asynchronous work queue.

use pawtrait_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// Kind of work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Train,
    Generate,
}

impl JobKind {
    /// Database representation stored in `jobs.job_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Train => "train",
            JobKind::Generate => "generate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "train" => Some(JobKind::Train),
            "generate" => Some(JobKind::Generate),
            _ => None,
        }
    }
}

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub job_type: String,
    pub status_id: StatusId,
    pub user_id: DbId,
    pub pet_id: DbId,
    pub model_id: Option<DbId>,
    pub pack_id: Option<DbId>,
    pub parameters: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub submitted_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Parsed job kind. `None` only if the row holds an unknown type,
    /// which would mean the table was written by a newer version.
    pub fn kind(&self) -> Option<JobKind> {
        JobKind::parse(&self.job_type)
    }
}

/// DTO for inserting a new job.
#[derive(Debug)]
pub struct SubmitJob {
    pub kind: JobKind,
    pub user_id: DbId,
    pub pet_id: DbId,
    pub model_id: Option<DbId>,
    pub pack_id: Option<DbId>,
    pub parameters: serde_json::Value,
}

/// Query parameters for listing a user's jobs.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    /// Filter by status ID (e.g. 1 = pending, 4 = failed).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
