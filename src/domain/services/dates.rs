use crate::domain::model::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt::Write;

/// Danish short date with two-digit hour and minute, rendered in UTC.
pub const DEFAULT_DATE_FORMAT: &str = "%-d.%-m.%Y, %H.%M";

/// Largest magnitude of epoch milliseconds a JavaScript `Date` accepts.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in NAIVE_DATE_TIME_FORMATS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        // epoch milliseconds
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|ms| ms.is_finite() && ms.abs() <= MAX_EPOCH_MILLIS)
                    .map(|ms| ms.trunc() as i64)
            })
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Renders `value` with `format`, or `None` when it is not a recognizable timestamp.
pub fn format_date(value: &Value, format: &str) -> Option<String> {
    let timestamp = parse_timestamp(value)?;
    let mut rendered = String::new();
    write!(rendered, "{}", timestamp.format(format)).ok()?;
    Some(rendered)
}

/// Returns a copy of `record` with every present `keys` entry reformatted.
///
/// Values that do not parse as timestamps are left untouched; the second element
/// lists the keys that were skipped for that reason. Nulls are left alone silently.
pub fn format_dates(record: &Record, keys: &[String], format: &str) -> (Record, Vec<String>) {
    let mut formatted = record.clone();
    let mut skipped = Vec::new();

    for key in keys {
        if let Some(value) = formatted.data.get_mut(key) {
            match format_date(value, format) {
                Some(rendered) => *value = Value::String(rendered),
                None if value.is_null() => {}
                None => skipped.push(key.clone()),
            }
        }
    }

    (formatted, skipped)
}
