use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Unvalidated applicant input keyed by field key.
///
/// Values are stored verbatim. Any non-empty value, whitespace included, counts as set;
/// reads through [`RawFormState::get`] are trimmed for coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFormState(BTreeMap<String, String>);

impl RawFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed value for `key`, or `None` when it is unset or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|value| !value.is_empty())
    }

    pub(crate) fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawFormState
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Canonical model input: every canonical key mapped to a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub(crate) fn from_complete(values: BTreeMap<String, f64>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values in canonical column order.
    pub fn iter_canonical(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        super::transform::canonical_keys()
            .iter()
            .map(move |key| (*key, self.0.get(*key).copied().unwrap_or(0.0)))
    }
}

/// Opaque identifier of the authenticated user issuing a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Credential issued by the external authentication component.
#[derive(Clone)]
pub struct BearerToken(Secret<String>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    /// Raw token, for forwarding to the persistence collaborator only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Bank,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "bank" => Some(Self::Bank),
            _ => None,
        }
    }
}

/// Explicit description of who is driving a form session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_id: Option<UserId>,
    pub bearer_token: Option<BearerToken>,
    pub role: UserRole,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: UserId, token: BearerToken, role: UserRole) -> Self {
        Self {
            user_id: Some(user_id),
            bearer_token: Some(token),
            role,
        }
    }

    /// Persistence needs both a credential and an owner; scoring needs neither.
    pub fn persistence_owner(&self) -> Option<&UserId> {
        self.bearer_token.as_ref().and(self.user_id.as_ref())
    }
}

/// Identifier assigned to a persisted submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Wall-clock source for the customer tenure derivation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
