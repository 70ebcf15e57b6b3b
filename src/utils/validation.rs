use crate::utils::error::{EtlError, Result};
use chrono::format::{Item, StrftimeItems};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_delimiter(field_name: &str, delimiter: char) -> Result<()> {
    let reason = if !delimiter.is_ascii() {
        Some("Delimiter must be a single ASCII character")
    } else if matches!(delimiter, '"' | '\r' | '\n') {
        Some("Delimiter cannot be a double quote or a line break")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.escape_default().to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Rejects strftime strings chrono would fail to render.
pub fn validate_date_format(field_name: &str, format: &str) -> Result<()> {
    validate_non_empty_string(field_name, format)?;

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format.to_string(),
            reason: "Unsupported strftime specifier".to_string(),
        });
    }
    Ok(())
}
