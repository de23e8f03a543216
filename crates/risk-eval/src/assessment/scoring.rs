//! Transport to the external scoring service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::classification::RiskLabel;
use super::domain::FeatureVector;
use super::interpret::ScoredRecord;
use crate::config::ScoringConfig;

const PAYLOAD_PART: &str = "file";
const PAYLOAD_FILENAME: &str = "data.csv";
const PAYLOAD_CONTENT_TYPE: &str = "text/csv";

/// Every transport, status, and shape failure collapses into this single error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring unavailable: {0}")]
    Unavailable(String),
}

impl ScoringError {
    fn unavailable(reason: impl ToString) -> Self {
        Self::Unavailable(reason.to_string())
    }
}

/// Tabular CSV payload: a header row of column names followed by one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPayload {
    csv: Vec<u8>,
}

impl ScoringPayload {
    /// Single-row table with one column per canonical key, in canonical order.
    pub fn from_vector(vector: &FeatureVector) -> Result<Self, ScoringError> {
        let (header, row): (Vec<&str>, Vec<String>) = vector
            .iter_canonical()
            .map(|(key, value)| (key, value.to_string()))
            .unzip();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&header).map_err(ScoringError::unavailable)?;
        writer.write_record(&row).map_err(ScoringError::unavailable)?;
        let csv = writer
            .into_inner()
            .map_err(|error| ScoringError::unavailable(error.error()))?;
        Ok(Self { csv })
    }

    /// Caller-supplied table forwarded unchanged.
    pub fn from_table(table: impl Into<Vec<u8>>) -> Self {
        Self { csv: table.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.csv
    }

    pub fn is_empty(&self) -> bool {
        self.csv.iter().all(u8::is_ascii_whitespace)
    }
}

/// Body returned by `POST /process-file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResponse {
    #[serde(default)]
    pub predictions: Vec<RiskLabel>,
    #[serde(default)]
    pub customer_ids: Option<Vec<serde_json::Value>>,
}

impl ScoringResponse {
    /// Pair each prediction with its customer id, or its row index when ids are absent.
    pub fn into_records(self) -> Vec<ScoredRecord> {
        let ids = self.customer_ids.unwrap_or_default();
        self.predictions
            .into_iter()
            .enumerate()
            .map(|(index, label)| ScoredRecord {
                customer_id: ids
                    .get(index)
                    .map(render_customer_id)
                    .unwrap_or_else(|| index.to_string()),
                label,
            })
            .collect()
    }
}

fn render_customer_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

/// Seam over the scoring service so the assessment service can run against fakes.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn submit(&self, payload: ScoringPayload) -> Result<ScoringResponse, ScoringError>;

    /// Score one feature vector; the first prediction is the record's label.
    async fn score(&self, vector: &FeatureVector) -> Result<RiskLabel, ScoringError> {
        let payload = ScoringPayload::from_vector(vector)?;
        let response = self.submit(payload).await?;
        response
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| ScoringError::unavailable("response carried no predictions"))
    }

    async fn score_batch(&self, payload: ScoringPayload) -> Result<Vec<ScoredRecord>, ScoringError> {
        let response = self.submit(payload).await?;
        if response.predictions.is_empty() {
            return Err(ScoringError::unavailable("response carried no predictions"));
        }
        Ok(response.into_records())
    }
}

/// HTTP client for the scoring service's `/process-file` endpoint. No retries.
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    client: Client,
    endpoint: String,
}

impl HttpScoringClient {
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ScoringError::unavailable)?;
        Ok(Self {
            client,
            endpoint: config.process_file_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RiskScorer for HttpScoringClient {
    async fn submit(&self, payload: ScoringPayload) -> Result<ScoringResponse, ScoringError> {
        let part = Part::bytes(payload.csv)
            .file_name(PAYLOAD_FILENAME)
            .mime_str(PAYLOAD_CONTENT_TYPE)
            .map_err(ScoringError::unavailable)?;
        let form = Form::new().part(PAYLOAD_PART, part);

        debug!(endpoint = %self.endpoint, "submitting scoring payload");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|error| {
                warn!(endpoint = %self.endpoint, %error, "scoring request failed");
                ScoringError::unavailable(error)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "scoring service rejected payload");
            return Err(ScoringError::Unavailable(format!(
                "scoring service returned {status}"
            )));
        }

        let body: ScoringResponse = response
            .json()
            .await
            .map_err(|error| ScoringError::unavailable(format!("malformed response: {error}")))?;
        if body.predictions.is_empty() {
            return Err(ScoringError::unavailable("response carried no predictions"));
        }
        Ok(body)
    }
}
