use crate::domain::model::Record;
use crate::domain::services::tabular::union_keys;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Elimination {
    pub records: Vec<Record>,
    /// Removed keys in first-seen order across the batch.
    pub removed_keys: Vec<String>,
}

/// Structural equality where numbers compare by numeric value, so `1 == 1.0`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| deep_equal(p, q))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, p)| y.get(key).is_some_and(|q| deep_equal(p, q)))
        }
        _ => a == b,
    }
}

/// A key is identical across the batch only if every record has it with a deep-equal value.
fn is_identical_across(batch: &[Record], key: &str) -> bool {
    let Some(first) = batch.first().and_then(|record| record.data.get(key)) else {
        return false;
    };
    batch[1..]
        .iter()
        .all(|record| record.data.get(key).is_some_and(|value| deep_equal(first, value)))
}

/// Removes the keys that are either ignored or hold the same value in every record.
///
/// Keys listed in `keep` survive both rules. With a single record every key is
/// trivially identical across the batch, so everything not kept is removed.
pub fn eliminate(batch: &[Record], keep: &[String], ignore: &[String]) -> Elimination {
    if batch.is_empty() {
        return Elimination {
            records: Vec::new(),
            removed_keys: Vec::new(),
        };
    }

    let keep: HashSet<&str> = keep.iter().map(String::as_str).collect();
    let ignore: HashSet<&str> = ignore.iter().map(String::as_str).collect();

    let removed_keys: Vec<String> = union_keys(batch)
        .into_iter()
        .filter(|key| !keep.contains(key))
        .filter(|key| ignore.contains(key) || is_identical_across(batch, key))
        .map(str::to_string)
        .collect();

    let removed: HashSet<&str> = removed_keys.iter().map(String::as_str).collect();
    let records = batch
        .iter()
        .map(|record| {
            Record::new(
                record
                    .data
                    .iter()
                    .filter(|(key, _)| !removed.contains(key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            )
        })
        .collect();

    Elimination {
        records,
        removed_keys,
    }
}
