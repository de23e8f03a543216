use crate::assessment::domain::RawFormState;

/// Fixed label → ordinal table for one categorical field. Unknown labels encode to 0.
pub(crate) struct OrdinalEncoding {
    pub key: &'static str,
    pub table: &'static [(&'static str, f64)],
}

impl OrdinalEncoding {
    pub fn encode(&self, raw: &RawFormState) -> f64 {
        raw.get(self.key)
            .and_then(|label| {
                self.table
                    .iter()
                    .find(|(known, _)| *known == label)
                    .map(|(_, ordinal)| *ordinal)
            })
            .unwrap_or(0.0)
    }
}

pub(crate) static ORDINAL_ENCODINGS: [OrdinalEncoding; 4] = [
    OrdinalEncoding {
        key: "MARITALSTATUS",
        table: &[
            ("Single", 1.0),
            ("Married", 2.0),
            ("Divorced", 3.0),
            ("Widowed", 4.0),
        ],
    },
    OrdinalEncoding {
        key: "EDUCATION",
        table: &[
            ("High School", 1.0),
            ("Bachelor", 2.0),
            ("Master", 3.0),
            ("PhD", 4.0),
            ("Other", 5.0),
            ("SSC", 1.0),
            ("12TH", 2.0),
            ("GRADUATE", 3.0),
            ("UNDER GRADUATE", 3.0),
            ("PROFESSIONAL", 3.0),
            ("POST-GRADUATE", 4.0),
            ("OTHERS", 1.0),
        ],
    },
    OrdinalEncoding {
        key: "GENDER",
        table: &[
            ("Male", 1.0),
            ("M", 1.0),
            ("Female", 2.0),
            ("F", 2.0),
            ("Other", 3.0),
        ],
    },
    OrdinalEncoding {
        key: "income_segment",
        table: &[
            ("Low", 1.0),
            ("Medium", 2.0),
            ("High", 3.0),
            ("Very High", 4.0),
        ],
    },
];

/// Binary indicator: 1 when the source field equals one of `labels`.
pub(crate) struct OneHotIndicator {
    pub key: &'static str,
    pub source: &'static str,
    pub labels: &'static [&'static str],
}

impl OneHotIndicator {
    pub fn indicate(&self, raw: &RawFormState) -> f64 {
        match raw.get(self.source) {
            Some(value) if self.labels.iter().any(|label| *label == value) => 1.0,
            _ => 0.0,
        }
    }
}

macro_rules! product_indicators {
    ($source:literal) => {
        [
            OneHotIndicator {
                key: concat!($source, "_AL"),
                source: $source,
                labels: &["AL"],
            },
            OneHotIndicator {
                key: concat!($source, "_CC"),
                source: $source,
                labels: &["CC"],
            },
            OneHotIndicator {
                key: concat!($source, "_ConsumerLoan"),
                source: $source,
                labels: &["ConsumerLoan"],
            },
            OneHotIndicator {
                key: concat!($source, "_HL"),
                source: $source,
                labels: &["HL"],
            },
            OneHotIndicator {
                key: concat!($source, "_PL"),
                source: $source,
                labels: &["PL"],
            },
            OneHotIndicator {
                key: concat!($source, "_others"),
                source: $source,
                labels: &["others", "Others"],
            },
        ]
    };
}

static DEMOGRAPHIC_INDICATORS: [OneHotIndicator; 4] = [
    OneHotIndicator {
        key: "MARITALSTATUS_Married",
        source: "MARITALSTATUS",
        labels: &["Married"],
    },
    OneHotIndicator {
        key: "MARITALSTATUS_Single",
        source: "MARITALSTATUS",
        labels: &["Single"],
    },
    OneHotIndicator {
        key: "GENDER_F",
        source: "GENDER",
        labels: &["F", "Female"],
    },
    OneHotIndicator {
        key: "GENDER_M",
        source: "GENDER",
        labels: &["M", "Male"],
    },
];

static LAST_PRODUCT_INDICATORS: [OneHotIndicator; 6] = product_indicators!("last_prod_enq2");
static FIRST_PRODUCT_INDICATORS: [OneHotIndicator; 6] = product_indicators!("first_prod_enq2");

pub(crate) fn one_hot_indicators() -> impl Iterator<Item = &'static OneHotIndicator> {
    DEMOGRAPHIC_INDICATORS
        .iter()
        .chain(LAST_PRODUCT_INDICATORS.iter())
        .chain(FIRST_PRODUCT_INDICATORS.iter())
}
