//! Raw form state → canonical model feature vector.
//!
//! The pipeline is total: malformed or missing input degrades to 0 rather than failing,
//! and the resulting vector always carries every canonical key with a finite value.

mod coercion;
mod defaults;
mod encoding;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::catalog::{all_fields, FieldKind};
use super::domain::{Clock, FeatureVector, RawFormState, SystemClock};
use coercion::{coerce_number, parse_number, tenure_days};
use defaults::DERIVED_DEFAULTS;
use encoding::{one_hot_indicators, ORDINAL_ENCODINGS};

pub use coercion::parse_calendar_date;

/// Every key the scoring model expects, in payload column order.
pub fn canonical_keys() -> &'static [&'static str] {
    static KEYS: OnceLock<Vec<&'static str>> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut keys: Vec<&'static str> = all_fields()
            .iter()
            .filter(|field| !field.is_categorical())
            .map(|field| field.key)
            .collect();

        for derived in &DERIVED_DEFAULTS {
            if !keys.contains(&derived.key) {
                keys.push(derived.key);
            }
        }
        keys.extend(ORDINAL_ENCODINGS.iter().map(|encoding| encoding.key));
        keys.extend(one_hot_indicators().map(|indicator| indicator.key));
        keys
    })
}

/// Pure mapping from [`RawFormState`] to [`FeatureVector`]; only the tenure derivation
/// consults the injected clock.
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer<C = SystemClock> {
    clock: C,
}

impl FeatureTransformer<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> FeatureTransformer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transform(&self, raw: &RawFormState) -> FeatureVector {
        let mut working: BTreeMap<&'static str, f64> = BTreeMap::new();

        for encoding in &ORDINAL_ENCODINGS {
            working.insert(encoding.key, encoding.encode(raw));
        }

        let now = self.clock.now();
        for field in all_fields() {
            match field.kind {
                FieldKind::Categorical { .. } => {}
                FieldKind::DateDuration => {
                    working.insert(field.key, tenure_days(raw.get(field.key), now));
                }
                FieldKind::Numeric { .. } | FieldKind::BinaryFlag => {
                    working.insert(field.key, coerce_number(raw.get(field.key)));
                }
            }
        }

        for derived in &DERIVED_DEFAULTS {
            let value = derived
                .sources()
                .find_map(|source| raw.get(source).and_then(parse_number))
                .unwrap_or(0.0);
            working.insert(derived.key, value);
        }

        for indicator in one_hot_indicators() {
            working.insert(indicator.key, indicator.indicate(raw));
        }

        let sanitized = canonical_keys()
            .iter()
            .map(|key| {
                let value = working
                    .get(key)
                    .copied()
                    .filter(|value| value.is_finite())
                    .unwrap_or(0.0);
                (key.to_string(), value)
            })
            .collect();

        FeatureVector::from_complete(sanitized)
    }
}
