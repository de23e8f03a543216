use chrono::{DateTime, NaiveDate, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parse a numeric input; anything that is not a finite number yields `None`.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Permissive coercion: unset or unparseable input becomes 0.
pub(crate) fn coerce_number(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number).unwrap_or(0.0)
}

/// Accepts `YYYY-MM-DD` (UTC midnight) or an RFC 3339 timestamp.
pub fn parse_calendar_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Whole days elapsed from `since` to `now`, floored.
pub(crate) fn whole_days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

pub(crate) fn tenure_days(raw: Option<&str>, now: DateTime<Utc>) -> f64 {
    raw.and_then(parse_calendar_date)
        .map(|since| whole_days_between(since, now) as f64)
        .unwrap_or(0.0)
}
