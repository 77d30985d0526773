//! Records and per-record results exchanged with an org

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record: field name -> value
pub type Record = Map<String, Value>;

/// Key holding system metadata on queried records
pub const ATTRIBUTES_KEY: &str = "attributes";

/// Outcome of one record in a bulk request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub success: bool,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub errors: Vec<String>,
}

impl SaveResult {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            id: None,
            errors,
        }
    }

    /// The new record id, when the record was created successfully
    pub fn created_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| self.success && !id.is_empty())
    }
}

/// Result of a select query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub total_size: usize,
    pub records: Vec<Record>,
}
