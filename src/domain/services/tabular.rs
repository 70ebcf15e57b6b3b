use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use std::collections::HashSet;

/// Union of the keys of every record, in first-seen order.
pub fn union_keys(batch: &[Record]) -> Vec<&str> {
    let mut seen = HashSet::new();
    batch
        .iter()
        .flat_map(|record| record.data.keys())
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect()
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Renders the batch as a header row plus one row per record.
///
/// Fields containing the delimiter, a double quote or a line break are quoted,
/// with embedded quotes doubled. The result has no trailing newline.
pub fn serialize(batch: &[Record], delimiter: char) -> Result<String> {
    if batch.is_empty() {
        return Err(EtlError::EmptyBatchError);
    }

    let keys = union_keys(batch);
    if keys.is_empty() {
        // empty header plus one empty row per record
        return Ok("\n".repeat(batch.len()));
    }

    let delimiter = u8::try_from(delimiter).map_err(|_| EtlError::InvalidConfigValueError {
        field: "delimiter".to_string(),
        value: delimiter.escape_default().to_string(),
        reason: "Delimiter must be a single ASCII character".to_string(),
    })?;

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&keys)?;
    for record in batch {
        writer.write_record(keys.iter().map(|key| render_cell(record.data.get(*key))))?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("failed to flush tabular output: {}", e),
    })?;
    let mut output = String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("tabular output is not valid UTF-8: {}", e),
    })?;

    if output.ends_with('\n') {
        output.pop();
    }
    Ok(output)
}
