//! The uniform return shape of a table read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReadError;

/// Rows fetched by a successful read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    /// Records exactly as the backend returned them.
    pub rows: Vec<Value>,
    /// Total row count from `Content-Range`, when the backend reported one.
    pub count: Option<u64>,
}

/// Either `{"rows": [...], "count": n|null}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Rows { rows: Vec<Value>, count: Option<u64> },
    Error { error: String },
}

impl Envelope {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Serialize to the compact JSON text handed back to callers.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("failed to serialize result: {e}") }).to_string()
        })
    }
}

impl From<TablePage> for Envelope {
    fn from(page: TablePage) -> Self {
        Self::Rows {
            rows: page.rows,
            count: page.count,
        }
    }
}

impl From<ReadError> for Envelope {
    fn from(err: ReadError) -> Self {
        Self::error(err.to_string())
    }
}

impl From<Result<TablePage, ReadError>> for Envelope {
    fn from(result: Result<TablePage, ReadError>) -> Self {
        match result {
            Ok(page) => page.into(),
            Err(err) => err.into(),
        }
    }
}
