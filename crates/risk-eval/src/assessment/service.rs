use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    Clock, FeatureVector, RawFormState, SessionContext, SubmissionId, SystemClock,
};
use super::form::{FormError, FormSession, SubmissionTicket};
use super::interpret::{RiskAssessment, RiskInterpreter};
use super::repository::{RepositoryError, SubmissionRecord, SubmissionRepository};
use super::scoring::{RiskScorer, ScoringError, ScoringPayload};
use super::transform::FeatureTransformer;

/// Service composing the transformer, scoring client, interpreter and repository.
pub struct RiskAssessmentService<S, P, C = SystemClock> {
    transformer: FeatureTransformer<C>,
    scorer: Arc<S>,
    interpreter: Mutex<RiskInterpreter>,
    repository: Arc<P>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    pub assessment: RiskAssessment,
    pub features: FeatureVector,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<SubmissionId>,
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("sub-{id:06}"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S, P> RiskAssessmentService<S, P, SystemClock>
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
{
    pub fn new(scorer: Arc<S>, repository: Arc<P>) -> Self {
        Self::with_parts(
            FeatureTransformer::new(),
            scorer,
            RiskInterpreter::new(),
            repository,
        )
    }
}

impl<S, P, C> RiskAssessmentService<S, P, C>
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    pub fn with_parts(
        transformer: FeatureTransformer<C>,
        scorer: Arc<S>,
        interpreter: RiskInterpreter,
        repository: Arc<P>,
    ) -> Self {
        Self {
            transformer,
            scorer,
            interpreter: Mutex::new(interpreter),
            repository,
        }
    }

    /// Feature vector for a possibly incomplete form, without scoring.
    pub fn preview(&self, raw: &RawFormState) -> FeatureVector {
        self.transformer.transform(raw)
    }

    /// Submit the session's form for scoring.
    ///
    /// The session lock is released while the scoring call is outstanding. If the session is
    /// edited, resubmitted or abandoned meanwhile, the result is discarded and
    /// [`FormError::StaleSubmission`] is returned.
    pub async fn submit(
        &self,
        session: &Mutex<FormSession>,
    ) -> Result<AssessmentOutcome, AssessmentServiceError> {
        let (ticket, context) = {
            let mut guard = lock(session);
            let ticket = guard.begin_submission()?;
            (ticket, guard.context().clone())
        };

        let features = self.transformer.transform(ticket.raw());
        info!(
            authenticated = context.persistence_owner().is_some(),
            "submitting assessment for scoring"
        );

        let label = match self.scorer.score(&features).await {
            Ok(label) => label,
            Err(error) => {
                warn!(%error, "scoring failed; form left intact for resubmission");
                if lock(session).fail_submission(&ticket).is_err() {
                    debug!("session moved on before scoring failed");
                }
                return Err(error.into());
            }
        };

        let assessment = lock(&self.interpreter).interpret(&label);

        if let Err(error) = lock(session).complete_submission(&ticket, assessment.clone()) {
            info!(label = %label, "discarding scoring result for superseded submission");
            return Err(error.into());
        }

        info!(
            label = %label,
            eligible = assessment.eligible,
            "assessment completed"
        );

        let submission_id = self.persist(&context, &ticket, &features, &assessment);
        Ok(AssessmentOutcome {
            persisted: submission_id.is_some(),
            assessment,
            features,
            submission_id,
        })
    }

    /// One-shot submission of a complete field map on behalf of `context`.
    pub async fn assess(
        &self,
        context: SessionContext,
        fields: &RawFormState,
    ) -> Result<AssessmentOutcome, AssessmentServiceError> {
        let session = FormSession::with_fields(context, fields.iter())?;
        self.submit(&Mutex::new(session)).await
    }

    /// Score a caller-supplied table and aggregate its predictions.
    pub async fn score_batch(
        &self,
        table: impl Into<Vec<u8>>,
    ) -> Result<RiskAssessment, AssessmentServiceError> {
        let payload = ScoringPayload::from_table(table);
        if payload.is_empty() {
            return Err(AssessmentServiceError::EmptyBatch);
        }

        let records = self.scorer.score_batch(payload).await?;
        info!(records = records.len(), "batch scored");
        lock(&self.interpreter)
            .interpret_batch(records)
            .ok_or(AssessmentServiceError::EmptyBatch)
    }

    pub fn list_submissions(
        &self,
        context: &SessionContext,
    ) -> Result<Vec<SubmissionRecord>, AssessmentServiceError> {
        let owner = context
            .persistence_owner()
            .ok_or(AssessmentServiceError::Unauthenticated)?;
        Ok(self.repository.list_for_user(owner)?)
    }

    fn persist(
        &self,
        context: &SessionContext,
        ticket: &SubmissionTicket,
        features: &FeatureVector,
        assessment: &RiskAssessment,
    ) -> Option<SubmissionId> {
        let Some(owner) = context.persistence_owner() else {
            debug!("no credentials on session; persistence skipped");
            return None;
        };

        let record = SubmissionRecord {
            submission_id: next_submission_id(),
            user_id: owner.clone(),
            role: context.role,
            raw: ticket.raw().clone(),
            features: features.clone(),
            assessment: assessment.clone(),
            submitted_at: self.transformer.clock().now(),
        };

        match self.repository.insert(record) {
            Ok(stored) => {
                info!(submission_id = %stored.submission_id.0, "submission persisted");
                Some(stored.submission_id)
            }
            Err(error) => {
                warn!(%error, "submission persistence failed");
                None
            }
        }
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("batch contained no records")]
    EmptyBatch,
    #[error("credentials required")]
    Unauthenticated,
}
