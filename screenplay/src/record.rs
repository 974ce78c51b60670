//! Persisted script records as served by the script storage API.
//!
//! Storage itself lives elsewhere; this module only decodes its payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Analysis, analyze};

/// Title given to records stored without one.
pub const DEFAULT_RECORD_TITLE: &str = "Untitled Script";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid script record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script API returned an error: {0}")]
    Api(String),
}

/// Opaque record id. The API serves numbers, but string ids are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptId::Number(n) => write!(f, "{}", n),
            ScriptId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub id: ScriptId,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_title() -> String {
    DEFAULT_RECORD_TITLE.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Error { error: String },
    Single { script: ScriptRecord },
    List { scripts: Vec<ScriptRecord> },
    Bare(ScriptRecord),
}

impl ScriptRecord {
    /// Decode one record, bare or wrapped as `{"script": {...}}`.
    pub fn from_json(json: &str) -> Result<ScriptRecord, RecordError> {
        match serde_json::from_str::<Payload>(json) {
            Ok(Payload::Single { script }) | Ok(Payload::Bare(script)) => Ok(script),
            Ok(Payload::Error { error }) => Err(RecordError::Api(error)),
            Ok(Payload::List { .. }) => Err(RecordError::Api(
                "expected a single script, got a script list".to_string(),
            )),
            // Re-decode as a bare record for a precise error position.
            Err(_) => Ok(serde_json::from_str::<ScriptRecord>(json)?),
        }
    }

    /// Decode the `{"scripts": [...]}` listing payload.
    pub fn list_from_json(json: &str) -> Result<Vec<ScriptRecord>, RecordError> {
        match serde_json::from_str::<Payload>(json) {
            Ok(Payload::List { scripts }) => Ok(scripts),
            Ok(Payload::Single { script }) | Ok(Payload::Bare(script)) => Ok(vec![script]),
            Ok(Payload::Error { error }) => Err(RecordError::Api(error)),
            Err(_) => Ok(serde_json::from_str::<Vec<ScriptRecord>>(json)?),
        }
    }

    pub fn analyze(&self) -> Analysis {
        analyze(&self.source)
    }
}
