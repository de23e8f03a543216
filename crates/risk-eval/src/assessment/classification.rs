use std::fmt;

use serde::{Deserialize, Serialize};

/// Risk bucket returned by the scoring model, best (P1) to worst (P4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskClassification {
    P1,
    P2,
    P3,
    P4,
}

impl RiskClassification {
    pub const ALL: [RiskClassification; 4] = [Self::P1, Self::P2, Self::P3, Self::P4];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "P1" => Some(Self::P1),
            "P2" => Some(Self::P2),
            "P3" => Some(Self::P3),
            "P4" => Some(Self::P4),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }

    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::P1 | Self::P2)
    }
}

impl fmt::Display for RiskClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A label as received from the scoring service. Anything outside P1..P4 is kept verbatim
/// so it can be reported, and interpreted as "unknown" rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLabel {
    Classified(RiskClassification),
    Unrecognized(String),
}

impl RiskLabel {
    pub fn classification(&self) -> Option<RiskClassification> {
        match self {
            Self::Classified(classification) => Some(*classification),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Classified(classification) => classification.label(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RiskLabel {
    fn from(raw: String) -> Self {
        match RiskClassification::parse(&raw) {
            Some(classification) => Self::Classified(classification),
            None => Self::Unrecognized(raw),
        }
    }
}

impl From<&str> for RiskLabel {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<RiskClassification> for RiskLabel {
    fn from(classification: RiskClassification) -> Self {
        Self::Classified(classification)
    }
}

impl From<RiskLabel> for String {
    fn from(label: RiskLabel) -> Self {
        match label {
            RiskLabel::Classified(classification) => classification.label().to_string(),
            RiskLabel::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_four_labels_classify() {
        for classification in RiskClassification::ALL {
            assert_eq!(RiskLabel::from(classification.label()), classification.into());
        }
        assert_eq!(
            RiskLabel::from("P5"),
            RiskLabel::Unrecognized("P5".to_string())
        );
        assert_eq!(RiskLabel::from("p1").classification(), None);
    }

    #[test]
    fn labels_round_trip_through_json_strings() {
        let labels: Vec<RiskLabel> =
            serde_json::from_str(r#"["P2", "unexpected"]"#).expect("labels parse");
        assert_eq!(labels[0].classification(), Some(RiskClassification::P2));
        assert_eq!(labels[1].as_str(), "unexpected");
        assert_eq!(
            serde_json::to_string(&labels).expect("serialize"),
            r#"["P2","unexpected"]"#
        );
    }
}
