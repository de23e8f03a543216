use crate::infra::{parse_as_of, read_form_file, InMemorySubmissionRepository};
use clap::Args;
use risk_eval::assessment::{
    AssessmentServiceError, FeatureTransformer, FixedClock, FormSession, HttpScoringClient,
    RiskAssessmentService, SessionContext,
};
use risk_eval::config::{AppConfig, ScoringConfig};
use risk_eval::error::AppError;
use risk_eval::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct TransformArgs {
    /// JSON form file: { "fields": { "<key>": "<value>", ... } }
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Pin "now" for the customer tenure derivation (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_as_of)]
    pub(crate) as_of: Option<FixedClock>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON form file: { "fields": { "<key>": "<value>", ... } }
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the scoring service base URL (MODEL_URL)
    #[arg(long)]
    pub(crate) model_url: Option<String>,
}

pub(crate) fn run_transform(args: TransformArgs) -> Result<(), AppError> {
    let fields = read_form_file(&args.input)?;
    let session = FormSession::with_fields(SessionContext::anonymous(), fields.iter())
        .map_err(AssessmentServiceError::from)?;

    let vector = match args.as_of {
        Some(clock) => FeatureTransformer::with_clock(clock).transform(&fields),
        None => FeatureTransformer::new().transform(&fields),
    };

    println!("Feature vector ({} columns)", vector.len());
    for (key, value) in vector.iter_canonical() {
        println!("  {key:<32} {value}");
    }

    let missing = session.missing_fields();
    if missing.is_empty() {
        println!("\nForm complete; ready to submit");
    } else {
        println!("\nMissing fields ({}): {}", missing.len(), missing.join(", "));
    }
    let out_of_domain = session.out_of_domain();
    if !out_of_domain.is_empty() {
        println!("Outside declared domain: {}", out_of_domain.join(", "));
    }
    Ok(())
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let scoring = match args.model_url {
        Some(url) => ScoringConfig::new(url, config.scoring.timeout)?,
        None => config.scoring,
    };
    let fields = read_form_file(&args.input)?;

    let service = RiskAssessmentService::new(
        Arc::new(HttpScoringClient::new(&scoring)?),
        Arc::new(InMemorySubmissionRepository::default()),
    );
    let outcome = service.assess(SessionContext::anonymous(), &fields).await?;
    let assessment = &outcome.assessment;

    println!("Risk assessment");
    println!(
        "  Classification: {} ({:?})",
        assessment.classification, assessment.category
    );
    println!(
        "  Eligible: {}",
        if assessment.eligible { "yes" } else { "no" }
    );
    println!("  {}", assessment.narrative);
    println!(
        "  Estimated credit score: {} (success rate {}%)",
        assessment.credit_score_estimate, assessment.success_rate
    );
    println!("  Credit factors:");
    for factor in &assessment.credit_factors {
        println!("    {:<20} {:>6.1}", factor.name, factor.score);
    }
    println!("  Suggestions:");
    for suggestion in &assessment.suggestions {
        println!("    - {suggestion}");
    }
    Ok(())
}
