use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use risk_eval::assessment::{
    all_fields, FeatureTransformer, FieldKind, FixedClock, HttpScoringClient, RawFormState,
    RepositoryError, RiskAssessmentService, RiskCategory, RiskInterpreter, RiskScorer,
    ScoringError, ScoringPayload, SessionContext, SubmissionRecord, SubmissionRepository, UserId,
};
use risk_eval::config::ScoringConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Default)]
struct NullRepository;

impl SubmissionRepository for NullRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        Ok(record)
    }

    fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

async fn spawn_scoring_service(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake scoring service");
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> HttpScoringClient {
    let config = ScoringConfig::new(base_url, Duration::from_secs(5)).expect("valid url");
    HttpScoringClient::new(&config).expect("client builds")
}

fn complete_fields() -> RawFormState {
    all_fields()
        .iter()
        .map(|field| {
            let value = match field.kind {
                FieldKind::Categorical { labels } => labels[0],
                FieldKind::DateDuration => "2019-07-01",
                FieldKind::BinaryFlag => "0",
                FieldKind::Numeric { .. } => "1",
            };
            (field.key, value)
        })
        .collect()
}

fn predicting(response: Value, uploads: Arc<Mutex<Vec<String>>>) -> Router {
    Router::new().route(
        "/process-file",
        post(move |body: Bytes| {
            let response = response.clone();
            let uploads = uploads.clone();
            async move {
                uploads
                    .lock()
                    .expect("uploads mutex poisoned")
                    .push(String::from_utf8_lossy(&body).into_owned());
                Json(response)
            }
        }),
    )
}

#[tokio::test]
async fn form_round_trips_through_http_scoring_service() {
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_scoring_service(predicting(
        json!({ "predictions": ["P1"], "customer_ids": [0] }),
        uploads.clone(),
    ))
    .await;

    let clock = FixedClock(chrono::DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
        .expect("timestamp")
        .with_timezone(&chrono::Utc));
    let service = RiskAssessmentService::with_parts(
        FeatureTransformer::with_clock(clock),
        Arc::new(client_for(&base_url)),
        RiskInterpreter::seeded(42),
        Arc::new(NullRepository),
    );

    let outcome = service
        .assess(SessionContext::anonymous(), &complete_fields())
        .await
        .expect("assessment succeeds");
    assert_eq!(outcome.assessment.category, RiskCategory::Excellent);
    assert!(outcome.assessment.eligible);
    assert!((740..850).contains(&outcome.assessment.credit_score_estimate));

    let uploads = uploads.lock().expect("uploads mutex poisoned");
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert!(upload.contains("name=\"file\""));
    assert!(upload.contains("filename=\"data.csv\""));
    assert!(upload.contains("text/csv"));
    assert!(upload.contains("customer_since"));
}

#[tokio::test]
async fn batch_results_carry_customer_ids() {
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_scoring_service(predicting(
        json!({ "predictions": ["P2", "P4"], "customer_ids": ["C-1", "C-2"] }),
        uploads.clone(),
    ))
    .await;

    let records = client_for(&base_url)
        .score_batch(ScoringPayload::from_table("PROSPECTID,CC_TL\nC-1,1\nC-2,5\n"))
        .await
        .expect("batch scored");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].customer_id, "C-1");
    assert_eq!(records[1].label.as_str(), "P4");
    assert!(uploads.lock().expect("uploads mutex poisoned")[0].contains("PROSPECTID"));
}

#[tokio::test]
async fn error_status_is_reported_as_unavailable() {
    let router = Router::new().route(
        "/process-file",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let base_url = spawn_scoring_service(router).await;

    let result = client_for(&base_url)
        .submit(ScoringPayload::from_table("a\n1\n"))
        .await;
    match result {
        Err(ScoringError::Unavailable(reason)) => assert!(reason.contains("500")),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_predictions_are_reported_as_unavailable() {
    let base_url = spawn_scoring_service(predicting(
        json!({ "status": "ok" }),
        Arc::new(Mutex::new(Vec::new())),
    ))
    .await;

    let result = client_for(&base_url)
        .submit(ScoringPayload::from_table("a\n1\n"))
        .await;
    assert!(matches!(result, Err(ScoringError::Unavailable(_))));
}

#[tokio::test]
async fn unreachable_service_is_reported_as_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let result = client_for(&format!("http://{addr}"))
        .submit(ScoringPayload::from_table("a\n1\n"))
        .await;
    assert!(matches!(result, Err(ScoringError::Unavailable(_))));
}
