use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::{fields_of, FieldDefinition, Section};
use super::domain::{BearerToken, Clock, RawFormState, SessionContext, UserId, UserRole};
use super::form::FormError;
use super::repository::SubmissionRepository;
use super::scoring::RiskScorer;
use super::service::{AssessmentServiceError, RiskAssessmentService};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Request body carrying raw form values keyed by field key.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FieldsRequest {
    #[serde(default)]
    pub fields: RawFormState,
}

#[derive(Debug, Serialize)]
struct SectionView {
    section: Section,
    label: &'static str,
    fields: Vec<&'static FieldDefinition>,
}

/// Router builder exposing the catalog, preview, assessment and history endpoints.
pub fn assessment_router<S, P, C>(service: Arc<RiskAssessmentService<S, P, C>>) -> Router
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/form/fields", get(fields_handler))
        .route("/api/v1/features", post(features_handler::<S, P, C>))
        .route("/api/v1/assessments", post(assess_handler::<S, P, C>))
        .route("/api/v1/assessments/batch", post(batch_handler::<S, P, C>))
        .route("/api/v1/submissions", get(submissions_handler::<S, P, C>))
        .with_state(service)
}

/// Session context asserted by the upstream authentication layer.
pub fn session_context(headers: &HeaderMap) -> SessionContext {
    let bearer_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(BearerToken::new);
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| UserId(id.to_string()));
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(UserRole::parse)
        .unwrap_or_default();

    SessionContext {
        user_id,
        bearer_token,
        role,
    }
}

pub(crate) async fn fields_handler() -> Response {
    let sections: Vec<SectionView> = Section::ALL
        .iter()
        .map(|section| SectionView {
            section: *section,
            label: section.label(),
            fields: fields_of(*section).collect(),
        })
        .collect();
    (StatusCode::OK, axum::Json(json!({ "sections": sections }))).into_response()
}

pub(crate) async fn features_handler<S, P, C>(
    State(service): State<Arc<RiskAssessmentService<S, P, C>>>,
    axum::Json(request): axum::Json<FieldsRequest>,
) -> Response
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    let features = service.preview(&request.fields);
    (StatusCode::OK, axum::Json(json!({ "features": features }))).into_response()
}

pub(crate) async fn assess_handler<S, P, C>(
    State(service): State<Arc<RiskAssessmentService<S, P, C>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<FieldsRequest>,
) -> Response
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    let context = session_context(&headers);
    match service.assess(context, &request.fields).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(AssessmentServiceError::Form(FormError::Incomplete { missing })) => {
            let payload = json!({
                "error": "form is incomplete",
                "missing_fields": missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn batch_handler<S, P, C>(
    State(service): State<Arc<RiskAssessmentService<S, P, C>>>,
    body: String,
) -> Response
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    match service.score_batch(body).await {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submissions_handler<S, P, C>(
    State(service): State<Arc<RiskAssessmentService<S, P, C>>>,
    headers: HeaderMap,
) -> Response
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    let context = session_context(&headers);
    match service.list_submissions(&context) {
        Ok(records) => (StatusCode::OK, axum::Json(json!({ "submissions": records }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Form(FormError::StaleSubmission) => StatusCode::CONFLICT,
        AssessmentServiceError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Scoring(_) => StatusCode::SERVICE_UNAVAILABLE,
        AssessmentServiceError::EmptyBatch => StatusCode::BAD_REQUEST,
        AssessmentServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AssessmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
