use metrics_exporter_prometheus::PrometheusHandle;
use risk_eval::assessment::{
    transform::parse_calendar_date, FieldsRequest, FixedClock, RawFormState, RepositoryError,
    SubmissionRecord, SubmissionRepository, UserId,
};
use risk_eval::error::AppError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local submission store; contents are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    records: Arc<Mutex<HashMap<UserId, Vec<SubmissionRecord>>>>,
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        let owned = guard.entry(record.user_id.clone()).or_default();
        if owned
            .iter()
            .any(|existing| existing.submission_id == record.submission_id)
        {
            return Err(RepositoryError::Conflict);
        }
        owned.push(record.clone());
        Ok(record)
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard
            .get(user_id)
            .map(|records| records.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

/// Reads a form file shaped like the assessment request body: `{ "fields": { ... } }`.
pub(crate) fn read_form_file(path: &Path) -> Result<RawFormState, AppError> {
    let contents = std::fs::read_to_string(path)?;
    let request: FieldsRequest = serde_json::from_str(&contents)?;
    Ok(request.fields)
}

pub(crate) fn parse_as_of(raw: &str) -> Result<FixedClock, String> {
    parse_calendar_date(raw)
        .map(FixedClock)
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or an RFC 3339 timestamp"))
}
