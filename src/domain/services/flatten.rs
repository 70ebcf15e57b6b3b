use crate::domain::model::Record;
use serde_json::{Map, Value};

pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// Flattens nested objects into a single level keyed by the joined path.
///
/// Arrays are leaves: they are copied as they are and never recursed into.
/// When two paths collide the later value wins, keeping the key's first position.
pub fn flatten(object: &Map<String, Value>, prefix: &str, delimiter: &str) -> Map<String, Value> {
    let mut result = Map::new();
    flatten_into(&mut result, object, prefix, delimiter);
    result
}

pub fn flatten_record(record: &Record, delimiter: &str) -> Record {
    Record::new(flatten(&record.data, "", delimiter))
}

fn flatten_into(out: &mut Map<String, Value>, object: &Map<String, Value>, prefix: &str, delimiter: &str) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, delimiter, key)
        };

        match value {
            Value::Object(nested) => flatten_into(out, nested, &path, delimiter),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}
