//! Presentation data derived from a risk label.
//!
//! Category, eligibility and narrative are fixed per label. The credit score estimate and
//! success rate are display heuristics drawn from label-specific ranges; the random source
//! is injected so tests can pin it.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::classification::{RiskClassification, RiskLabel};

const MAX_CREDIT_SCORE: f64 = 850.0;

const COMMON_SUGGESTIONS: [&str; 4] = [
    "Make all payments on time",
    "Keep credit utilization below 30%",
    "Maintain older credit accounts",
    "Limit new credit applications",
];

const CREDIT_FACTOR_WEIGHTS: [(&str, f64); 5] = [
    ("Payment History", 0.35),
    ("Credit Utilization", 0.30),
    ("Credit Age", 0.15),
    ("Account Mix", 0.10),
    ("Recent Inquiries", 0.10),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl RiskCategory {
    fn of(label: &RiskLabel) -> Self {
        match label.classification() {
            Some(RiskClassification::P1) => Self::Excellent,
            Some(RiskClassification::P2) => Self::Good,
            Some(RiskClassification::P3) => Self::Fair,
            Some(RiskClassification::P4) => Self::Poor,
            None => Self::Unknown,
        }
    }
}

/// Weighted contribution of one credit factor, as a percentage capped at 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditFactor {
    pub name: String,
    pub score: f64,
}

/// One scored record of a batch, identified by customer id or row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub customer_id: String,
    pub label: RiskLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub classification: RiskLabel,
    pub credit_score_estimate: u16,
    pub category: RiskCategory,
    pub eligible: bool,
    pub narrative: String,
    pub success_rate: u8,
    pub suggestions: Vec<String>,
    pub credit_factors: Vec<CreditFactor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predictions: Vec<ScoredRecord>,
}

/// Maps labels to [`RiskAssessment`]s.
#[derive(Debug)]
pub struct RiskInterpreter<R = StdRng> {
    rng: R,
}

impl RiskInterpreter<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible interpreter for tests and offline tooling.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RiskInterpreter<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RiskInterpreter<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn interpret(&mut self, label: &RiskLabel) -> RiskAssessment {
        let credit_score_estimate = self.sample_credit_score(label);
        self.assemble(label.clone(), credit_score_estimate, Vec::new())
    }

    /// Single assessment for a batch: the most frequent label (ties go to the first one
    /// seen) decides category, eligibility and narrative, while the score estimate is the
    /// rounded mean of one sample per prediction. `None` for an empty batch.
    pub fn interpret_batch(&mut self, records: Vec<ScoredRecord>) -> Option<RiskAssessment> {
        let dominant = dominant_label(&records)?;

        let total: u32 = records
            .iter()
            .map(|record| u32::from(self.sample_credit_score(&record.label)))
            .sum();
        let mean = (f64::from(total) / records.len() as f64).round() as u16;

        Some(self.assemble(dominant, mean, records))
    }

    fn assemble(
        &mut self,
        label: RiskLabel,
        credit_score_estimate: u16,
        predictions: Vec<ScoredRecord>,
    ) -> RiskAssessment {
        let category = RiskCategory::of(&label);
        let eligible = label
            .classification()
            .is_some_and(RiskClassification::is_eligible);
        let success_rate = if eligible {
            self.rng.gen_range(75..95)
        } else {
            self.rng.gen_range(40..74)
        };

        RiskAssessment {
            narrative: narrative(&label).to_string(),
            suggestions: suggestions(&label),
            credit_factors: credit_factors(credit_score_estimate),
            classification: label,
            credit_score_estimate,
            category,
            eligible,
            success_rate,
            predictions,
        }
    }

    fn sample_credit_score(&mut self, label: &RiskLabel) -> u16 {
        match label.classification() {
            Some(classification) => self.rng.gen_range(credit_score_range(classification)),
            None => 0,
        }
    }
}

/// Half-open sampling range for the displayed score estimate.
pub fn credit_score_range(classification: RiskClassification) -> Range<u16> {
    match classification {
        RiskClassification::P1 => 740..850,
        RiskClassification::P2 => 670..740,
        RiskClassification::P3 => 580..670,
        RiskClassification::P4 => 300..580,
    }
}

fn dominant_label(records: &[ScoredRecord]) -> Option<RiskLabel> {
    let mut tally: Vec<(&RiskLabel, usize)> = Vec::new();
    for record in records {
        match tally.iter_mut().find(|(label, _)| **label == record.label) {
            Some((_, count)) => *count += 1,
            None => tally.push((&record.label, 1)),
        }
    }

    // max_by_key keeps the last maximum, so scan in reverse to favour first-seen labels.
    tally
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(label, _)| label.clone())
}

fn narrative(label: &RiskLabel) -> &'static str {
    match label.classification() {
        Some(RiskClassification::P1) => "Excellent credit risk - Highly likely to repay loans",
        Some(RiskClassification::P2) => "Good credit risk - Generally reliable in loan repayment",
        Some(RiskClassification::P3) => {
            "Fair credit risk - Some concerns about repayment ability"
        }
        Some(RiskClassification::P4) => "Poor credit risk - High risk of default",
        None => "Unable to determine risk level",
    }
}

fn suggestions(label: &RiskLabel) -> Vec<String> {
    let specific: &[&str] = match label.classification() {
        Some(RiskClassification::P1) => &[
            "Consider diversifying credit mix for even better scores",
            "Monitor credit report regularly to maintain excellent status",
            "You may qualify for premium credit products",
        ],
        Some(RiskClassification::P2) => &[
            "Work on reducing credit utilization",
            "Continue consistent payment history",
            "Consider consolidating any high-interest debt",
        ],
        Some(RiskClassification::P3) => &[
            "Focus on making all payments on time",
            "Reduce overall debt levels",
            "Avoid applying for new credit",
            "Consider credit counseling services",
        ],
        Some(RiskClassification::P4) => &[
            "Prioritize paying off overdue accounts",
            "Set up payment reminders",
            "Consider credit repair services",
            "Look into secured credit products",
        ],
        None => &[],
    };

    COMMON_SUGGESTIONS
        .iter()
        .chain(specific)
        .map(|tip| tip.to_string())
        .collect()
}

fn credit_factors(credit_score: u16) -> Vec<CreditFactor> {
    CREDIT_FACTOR_WEIGHTS
        .iter()
        .map(|(name, weight)| CreditFactor {
            name: name.to_string(),
            score: (f64::from(credit_score) * weight / MAX_CREDIT_SCORE * 100.0).min(100.0),
        })
        .collect()
}
