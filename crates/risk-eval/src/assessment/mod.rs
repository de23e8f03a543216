//! Applicant risk assessment: form catalog and session, feature transformation, scoring
//! transport, interpretation, persistence boundary and HTTP surface.

pub mod catalog;
pub mod classification;
pub mod domain;
pub mod form;
pub mod interpret;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod transform;

#[cfg(test)]
mod tests;

pub use catalog::{all_fields, field, fields_of, FieldDefinition, FieldKind, Section};
pub use classification::{RiskClassification, RiskLabel};
pub use domain::{
    BearerToken, Clock, FeatureVector, FixedClock, RawFormState, SessionContext, SubmissionId,
    SystemClock, UserId, UserRole,
};
pub use form::{FormError, FormSession, SectionProgress, SubmissionPhase, SubmissionTicket};
pub use interpret::{CreditFactor, RiskAssessment, RiskCategory, RiskInterpreter, ScoredRecord};
pub use repository::{RepositoryError, SubmissionRecord, SubmissionRepository};
pub use router::{assessment_router, session_context, FieldsRequest};
pub use scoring::{HttpScoringClient, RiskScorer, ScoringError, ScoringPayload, ScoringResponse};
pub use service::{AssessmentOutcome, AssessmentServiceError, RiskAssessmentService};
pub use transform::{canonical_keys, FeatureTransformer};
