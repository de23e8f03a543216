use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{FeatureVector, RawFormState, SubmissionId, UserId, UserRole};
use super::interpret::RiskAssessment;

/// Stored submission: the raw form, the vector sent for scoring, and its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: SubmissionId,
    pub user_id: UserId,
    pub role: UserRole,
    pub raw: RawFormState,
    pub features: FeatureVector,
    pub assessment: RiskAssessment,
    pub submitted_at: DateTime<Utc>,
}

/// Storage abstraction keyed by the submitting user.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError>;
    /// Records owned by `user_id`, newest first.
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SubmissionRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
