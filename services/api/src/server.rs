use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubmissionRepository};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use risk_eval::assessment::{HttpScoringClient, RiskAssessmentService};
use risk_eval::config::{AppConfig, ScoringConfig};
use risk_eval::error::AppError;
use risk_eval::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(model_url) = args.model_url.take() {
        config.scoring = ScoringConfig::new(model_url, config.scoring.timeout)?;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let scorer = Arc::new(HttpScoringClient::new(&config.scoring)?);
    let repository = Arc::new(InMemorySubmissionRepository::default());
    let assessment_service = Arc::new(RiskAssessmentService::new(scorer.clone(), repository));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        scoring_endpoint = scorer.endpoint(),
        "risk assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
