use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the input array. Keys keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// `index` is the position in the source array, used for the error message.
    pub fn from_value(index: usize, value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(EtlError::ValidationError {
                message: format!(
                    "element {} of the input array is not an object: {}",
                    index, other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_records: Vec<Record>,
    pub removed_keys: Vec<String>,
    pub json_output: String,
    pub tabular_output: String,
}
