use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use risk_eval::assessment::{
    assessment_router, Clock, RiskAssessmentService, RiskScorer, SubmissionRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_assessment_routes<S, P, C>(
    service: Arc<RiskAssessmentService<S, P, C>>,
) -> axum::Router
where
    S: RiskScorer + 'static,
    P: SubmissionRepository + 'static,
    C: Clock + 'static,
{
    assessment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemorySubmissionRepository;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use risk_eval::assessment::{ScoringError, ScoringPayload, ScoringResponse};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct OfflineScorer;

    #[async_trait]
    impl RiskScorer for OfflineScorer {
        async fn submit(&self, _payload: ScoringPayload) -> Result<ScoringResponse, ScoringError> {
            Err(ScoringError::Unavailable("offline".to_string()))
        }
    }

    fn app(ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let service = Arc::new(RiskAssessmentService::new(
            Arc::new(OfflineScorer),
            Arc::new(InMemorySubmissionRepository::default()),
        ));
        with_assessment_routes(service).layer(Extension(state))
    }

    async fn status_of(router: axum::Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        assert_eq!(status_of(app(false), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_listener_flag() {
        assert_eq!(
            status_of(app(false), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(app(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_render_prometheus_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn assessment_routes_are_mounted() {
        assert_eq!(
            status_of(app(true), "/api/v1/form/fields").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(app(true), "/api/v1/submissions").await,
            StatusCode::UNAUTHORIZED
        );
    }
}
