use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::assessment::catalog::{all_fields, FieldKind};
use crate::assessment::domain::{
    BearerToken, FixedClock, RawFormState, SessionContext, UserId, UserRole,
};
use crate::assessment::form::FormSession;
use crate::assessment::interpret::RiskInterpreter;
use crate::assessment::repository::{RepositoryError, SubmissionRecord, SubmissionRepository};
use crate::assessment::scoring::{RiskScorer, ScoringError, ScoringPayload, ScoringResponse};
use crate::assessment::service::RiskAssessmentService;
use crate::assessment::transform::FeatureTransformer;
use crate::assessment::{assessment_router, RiskLabel};

pub(super) fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
}

pub(super) fn transformer() -> FeatureTransformer<FixedClock> {
    FeatureTransformer::with_clock(fixed_clock())
}

/// Every declared field populated with a plausible value.
pub(super) fn complete_fields() -> RawFormState {
    all_fields()
        .iter()
        .map(|field| {
            let value = match (field.key, field.kind) {
                ("CC_TL", _) => "2",
                ("Home_TL", _) => "1",
                ("MARITALSTATUS", _) => "Married",
                ("EDUCATION", _) => "Bachelor",
                ("GENDER", _) => "Female",
                ("last_prod_enq2", _) => "PL",
                ("first_prod_enq2", _) => "CC",
                ("income_segment", _) => "Medium",
                ("customer_since", _) => "2020-01-01",
                (_, FieldKind::BinaryFlag) => "1",
                _ => "0",
            };
            (field.key, value)
        })
        .collect()
}

pub(super) fn complete_session(context: SessionContext) -> FormSession {
    let fields = complete_fields();
    FormSession::with_fields(context, fields.iter()).expect("catalog keys only")
}

pub(super) fn authenticated_context() -> SessionContext {
    SessionContext::authenticated(
        UserId("user-42".to_string()),
        BearerToken::new("token-abc"),
        UserRole::Customer,
    )
}

type SubmitHook = Box<dyn Fn() + Send + Sync>;

/// Scorer answering from a fixed label list, optionally failing or running a hook while the
/// call is outstanding.
#[derive(Default)]
pub(super) struct StubScorer {
    labels: Vec<String>,
    customer_ids: Option<Vec<Value>>,
    failure: Option<String>,
    on_submit: Option<SubmitHook>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<Vec<u8>>>,
}

impl StubScorer {
    pub(super) fn answering(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|label| label.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub(super) fn with_customer_ids(mut self, ids: Vec<Value>) -> Self {
        self.customer_ids = Some(ids);
        self
    }

    pub(super) fn on_submit(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Box::new(hook));
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_payload(&self) -> Option<String> {
        self.payloads
            .lock()
            .expect("payload mutex poisoned")
            .last()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[async_trait]
impl RiskScorer for StubScorer {
    async fn submit(&self, payload: ScoringPayload) -> Result<ScoringResponse, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .lock()
            .expect("payload mutex poisoned")
            .push(payload.as_bytes().to_vec());
        if let Some(hook) = &self.on_submit {
            hook();
        }
        if let Some(reason) = &self.failure {
            return Err(ScoringError::Unavailable(reason.clone()));
        }
        Ok(ScoringResponse {
            predictions: self
                .labels
                .iter()
                .map(|label| RiskLabel::from(label.as_str()))
                .collect(),
            customer_ids: self.customer_ids.clone(),
        })
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<SubmissionRecord>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self) -> Vec<SubmissionRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl SubmissionRepository for MemoryRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.submission_id == record.submission_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn insert(&self, _record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService<R = MemoryRepository> =
    RiskAssessmentService<StubScorer, R, FixedClock>;

pub(super) fn build_service_with<R: SubmissionRepository + 'static>(
    scorer: StubScorer,
    repository: Arc<R>,
) -> (TestService<R>, Arc<StubScorer>) {
    let scorer = Arc::new(scorer);
    let service = RiskAssessmentService::with_parts(
        transformer(),
        scorer.clone(),
        RiskInterpreter::seeded(7),
        repository,
    );
    (service, scorer)
}

pub(super) fn build_service(
    scorer: StubScorer,
) -> (TestService, Arc<StubScorer>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let (service, scorer) = build_service_with(scorer, repository.clone());
    (service, scorer, repository)
}

pub(super) fn router_with(scorer: StubScorer) -> (axum::Router, Arc<MemoryRepository>) {
    let (service, _, repository) = build_service(scorer);
    (assessment_router(Arc::new(service)), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
