use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Failed to read '{path}': {reason}")]
    FileReadError { path: String, reason: String },

    #[error("Failed to write '{path}': {reason}")]
    FileWriteError { path: String, reason: String },

    #[error("Record batch is empty, no tabular header can be derived")]
    EmptyBatchError,

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Data,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::FileReadError { .. }
            | EtlError::FileWriteError { .. }
            | EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::EmptyBatchError
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::Serialization
            }
        }
    }

    /// Write failures are reported but never abort a run, so they rank lowest.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::FileWriteError { .. } => ErrorSeverity::Low,
            EtlError::ValidationError { .. } => ErrorSeverity::Medium,
            EtlError::FileReadError { .. }
            | EtlError::EmptyBatchError
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::CsvError(_)
            | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::FileReadError { .. } => {
                "Check that the input path exists and contains a JSON array of objects"
            }
            EtlError::FileWriteError { .. } => {
                "Check permissions of the output directory and free disk space"
            }
            EtlError::EmptyBatchError => "Provide an input array with at least one record",
            EtlError::InvalidConfigValueError { .. } => {
                "Run with --help to see the accepted options and their formats"
            }
            EtlError::ValidationError { .. } => {
                "Make sure every element of the input array is a JSON object"
            }
            EtlError::ProcessingError { .. }
            | EtlError::CsvError(_)
            | EtlError::SerializationError(_) => {
                "Re-run with --verbose and inspect the offending records"
            }
            EtlError::IoError(_) => "Check the file system and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::FileReadError { path, .. } => {
                format!("Could not load records from '{}'", path)
            }
            EtlError::FileWriteError { path, .. } => format!("Could not write '{}'", path),
            EtlError::EmptyBatchError => "The input contains no records".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
