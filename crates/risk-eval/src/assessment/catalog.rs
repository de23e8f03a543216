//! Static declaration of every applicant input the assessment form collects.

use serde::Serialize;

/// One step of the multi-step form, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    AccountActivity,
    AccountTypes,
    Delinquency,
    Inquiries,
    TradeLines,
    LoanFlags,
    CustomerInfo,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::AccountActivity,
        Section::AccountTypes,
        Section::Delinquency,
        Section::Inquiries,
        Section::TradeLines,
        Section::LoanFlags,
        Section::CustomerInfo,
    ];

    pub const FIRST: Section = Section::AccountActivity;
    pub const LAST: Section = Section::CustomerInfo;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Section> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Section> {
        self.index().checked_sub(1).map(|idx| Self::ALL[idx])
    }

    pub const fn label(self) -> &'static str {
        match self {
            Section::AccountActivity => "Account Activity",
            Section::AccountTypes => "Account Types",
            Section::Delinquency => "Delinquency",
            Section::Inquiries => "Inquiries",
            Section::TradeLines => "Trade Lines",
            Section::LoanFlags => "Loan Flags",
            Section::CustomerInfo => "Customer Info",
        }
    }
}

/// Data type of a field, with its valid domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Numeric {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Categorical {
        labels: &'static [&'static str],
    },
    DateDuration,
    BinaryFlag,
}

const COUNT: FieldKind = FieldKind::Numeric {
    min: Some(0.0),
    max: None,
};
const RATIO: FieldKind = FieldKind::Numeric {
    min: Some(0.0),
    max: Some(1.0),
};

pub const MARITAL_STATUS_LABELS: &[&str] = &["Married", "Single", "Divorced", "Widowed"];
pub const EDUCATION_LABELS: &[&str] = &[
    "SSC",
    "12TH",
    "GRADUATE",
    "UNDER GRADUATE",
    "POST-GRADUATE",
    "PROFESSIONAL",
    "OTHERS",
    "High School",
    "Bachelor",
    "Master",
    "PhD",
    "Other",
];
pub const GENDER_LABELS: &[&str] = &["F", "M", "Female", "Male", "Other"];
pub const PRODUCT_LABELS: &[&str] = &["AL", "CC", "ConsumerLoan", "HL", "PL", "others", "Others"];
pub const INCOME_SEGMENT_LABELS: &[&str] = &["Low", "Medium", "High", "Very High"];

/// Immutable description of a single form input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub section: Section,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDefinition {
    const fn new(key: &'static str, section: Section, kind: FieldKind) -> Self {
        Self { key, section, kind }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Whether a non-empty value conforms to the declared domain. Advisory only.
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }

        match self.kind {
            FieldKind::Numeric { min, max } => match value.parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    min.map_or(true, |min| number >= min) && max.map_or(true, |max| number <= max)
                }
                _ => false,
            },
            FieldKind::Categorical { labels } => labels.iter().any(|label| *label == value),
            FieldKind::DateDuration => super::transform::parse_calendar_date(value).is_some(),
            FieldKind::BinaryFlag => matches!(value, "0" | "1"),
        }
    }
}

use FieldKind::{BinaryFlag, DateDuration};
use Section::*;

static FIELDS: [FieldDefinition; 53] = [
    FieldDefinition::new("pct_tl_open_L6M", AccountActivity, RATIO),
    FieldDefinition::new("pct_tl_closed_L6M", AccountActivity, RATIO),
    FieldDefinition::new("Tot_TL_closed_L12M", AccountActivity, COUNT),
    FieldDefinition::new("pct_tl_closed_L12M", AccountActivity, RATIO),
    FieldDefinition::new("Tot_Missed_Pmnt", AccountActivity, COUNT),
    FieldDefinition::new("CC_TL", AccountTypes, COUNT),
    FieldDefinition::new("Home_TL", AccountTypes, COUNT),
    FieldDefinition::new("PL_TL", AccountTypes, COUNT),
    FieldDefinition::new("Secured_TL", AccountTypes, COUNT),
    FieldDefinition::new("Unsecured_TL", AccountTypes, COUNT),
    FieldDefinition::new("Other_TL", AccountTypes, COUNT),
    FieldDefinition::new("Age_Oldest_TL", AccountTypes, COUNT),
    FieldDefinition::new("Age_Newest_TL", AccountTypes, COUNT),
    FieldDefinition::new("time_since_recent_payment", AccountTypes, COUNT),
    FieldDefinition::new("max_recent_level_of_deliq", Delinquency, COUNT),
    FieldDefinition::new("num_deliq_6_12mts", Delinquency, COUNT),
    FieldDefinition::new("num_times_60p_dpd", Delinquency, COUNT),
    FieldDefinition::new("num_std_12mts", Delinquency, COUNT),
    FieldDefinition::new("num_sub", Delinquency, COUNT),
    FieldDefinition::new("num_sub_6mts", Delinquency, COUNT),
    FieldDefinition::new("num_sub_12mts", Delinquency, COUNT),
    FieldDefinition::new("max_dpd_6_12mts", Delinquency, COUNT),
    FieldDefinition::new("max_dpd_12mts", Delinquency, COUNT),
    FieldDefinition::new("num_dbt", Delinquency, COUNT),
    FieldDefinition::new("num_dbt_12mts", Delinquency, COUNT),
    FieldDefinition::new("num_lss", Delinquency, COUNT),
    FieldDefinition::new("recent_level_of_deliq", Delinquency, COUNT),
    FieldDefinition::new("num_enq_6mts", Inquiries, COUNT),
    FieldDefinition::new("num_enq_12mts", Inquiries, COUNT),
    FieldDefinition::new("CC_enq_L12m", Inquiries, COUNT),
    FieldDefinition::new("PL_enq_L12m", Inquiries, COUNT),
    FieldDefinition::new("time_since_recent_enq", Inquiries, COUNT),
    FieldDefinition::new("enq_L3m", Inquiries, COUNT),
    FieldDefinition::new("pct_PL_enq_L6m_of_ever", Inquiries, RATIO),
    FieldDefinition::new("pct_CC_enq_L6m_of_ever", Inquiries, RATIO),
    FieldDefinition::new("tot_open_tl", TradeLines, COUNT),
    FieldDefinition::new("tot_closed_tl", TradeLines, COUNT),
    FieldDefinition::new("tot_active_tl", TradeLines, COUNT),
    FieldDefinition::new("Total_TL_opened_L6M", TradeLines, COUNT),
    FieldDefinition::new("tot_tl_closed_L6M", TradeLines, COUNT),
    FieldDefinition::new("CC_Flag", LoanFlags, BinaryFlag),
    FieldDefinition::new("PL_Flag", LoanFlags, BinaryFlag),
    FieldDefinition::new("HL_Flag", LoanFlags, BinaryFlag),
    FieldDefinition::new("GL_Flag", LoanFlags, BinaryFlag),
    FieldDefinition::new("NETMONTHLYINCOME", CustomerInfo, COUNT),
    FieldDefinition::new("Time_With_Curr_Empr", CustomerInfo, COUNT),
    FieldDefinition::new(
        "MARITALSTATUS",
        CustomerInfo,
        FieldKind::Categorical {
            labels: MARITAL_STATUS_LABELS,
        },
    ),
    FieldDefinition::new(
        "EDUCATION",
        CustomerInfo,
        FieldKind::Categorical {
            labels: EDUCATION_LABELS,
        },
    ),
    FieldDefinition::new(
        "GENDER",
        CustomerInfo,
        FieldKind::Categorical {
            labels: GENDER_LABELS,
        },
    ),
    FieldDefinition::new(
        "last_prod_enq2",
        CustomerInfo,
        FieldKind::Categorical {
            labels: PRODUCT_LABELS,
        },
    ),
    FieldDefinition::new(
        "first_prod_enq2",
        CustomerInfo,
        FieldKind::Categorical {
            labels: PRODUCT_LABELS,
        },
    ),
    FieldDefinition::new(
        "income_segment",
        CustomerInfo,
        FieldKind::Categorical {
            labels: INCOME_SEGMENT_LABELS,
        },
    ),
    FieldDefinition::new("customer_since", CustomerInfo, DateDuration),
];

/// Every declared field, grouped by section in form order.
pub fn all_fields() -> &'static [FieldDefinition] {
    &FIELDS
}

/// Fields belonging to `section`, in presentation order.
pub fn fields_of(section: Section) -> impl Iterator<Item = &'static FieldDefinition> {
    FIELDS.iter().filter(move |field| field.section == section)
}

/// Look up a field by its key.
pub fn field(key: &str) -> Option<&'static FieldDefinition> {
    FIELDS.iter().find(|field| field.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = all_fields().iter().map(|field| field.key).collect();
        assert_eq!(keys.len(), all_fields().len());
    }

    #[test]
    fn fields_are_listed_in_section_order() {
        let sections: Vec<_> = all_fields().iter().map(|field| field.section).collect();
        let mut sorted = sections.clone();
        sorted.sort();
        assert_eq!(sections, sorted);
        for section in Section::ALL {
            assert!(
                fields_of(section).next().is_some(),
                "{section:?} declares no fields"
            );
        }
    }

    #[test]
    fn section_navigation_is_linear() {
        assert_eq!(Section::FIRST.previous(), None);
        assert_eq!(Section::LAST.next(), None);
        assert_eq!(Section::Inquiries.next(), Some(Section::TradeLines));
        assert_eq!(Section::Inquiries.previous(), Some(Section::Delinquency));
    }

    #[test]
    fn domains_are_advisory_checks() {
        let ratio = field("pct_tl_open_L6M").expect("declared");
        assert!(ratio.accepts("0.25"));
        assert!(!ratio.accepts("1.5"));
        assert!(!ratio.accepts("abc"));

        let flag = field("HL_Flag").expect("declared");
        assert!(flag.accepts("1"));
        assert!(!flag.accepts("yes"));

        let gender = field("GENDER").expect("declared");
        assert!(gender.accepts("Female"));
        assert!(!gender.accepts("unknown"));

        let since = field("customer_since").expect("declared");
        assert!(since.accepts("2020-01-01"));
        assert!(!since.accepts("last year"));
    }

    #[test]
    fn unknown_keys_are_not_declared() {
        assert!(field("PROSPECTID").is_none());
        assert!(field("pct_currentBal_all_TL").is_none());
    }
}
