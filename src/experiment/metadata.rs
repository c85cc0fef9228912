//! Run Metadata - the flat key/value document written next to each run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use super::EXP_NAME_KEY;
use crate::{Error, Result};

/// Parsed `config.json` of a run.
///
/// Only the experiment name is interpreted; every other key is kept
/// verbatim so callers can inspect the run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunMetadata {
    config: Map<String, Value>,
}

impl RunMetadata {
    /// Read and parse a metadata file.
    ///
    /// # Errors
    ///
    /// Returns `Error::MetadataError` if the file cannot be read, is not valid
    /// JSON, or is not a JSON object.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::MetadataError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text).map_err(|e| Error::MetadataError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse metadata from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(config) => Ok(Self { config }),
            other => Err(Error::InvalidInput(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Experiment name (`exp_name`), if present and not null.
    ///
    /// Non-string values are rendered as their JSON text.
    #[must_use]
    pub fn exp_name(&self) -> Option<String> {
        match self.config.get(EXP_NAME_KEY)? {
            Value::Null => None,
            Value::String(name) => Some(name.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Raw configuration entries.
    #[must_use]
    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
