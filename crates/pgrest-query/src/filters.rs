//! Equality filter encoding: `{"col": v}` → `col=eq.<v>`.

use serde_json::Value;

use pgrest_core::request::{json_kind, Filters};
use pgrest_core::{ReadError, Result};

/// Encoded filters as `(column, "eq.<value>")` pairs, in input order.
pub type EncodedFilters = Vec<(String, String)>;

/// Encode every filter as a PostgREST equality operator.
///
/// Booleans become `true`/`false`, strings are used verbatim and numbers use
/// their JSON text. The input is left untouched.
///
/// # Errors
///
/// Returns [`ReadError::Encoding`] for `null`, arrays, and objects; these
/// have no single equality value.
pub fn encode_filters(filters: &Filters) -> Result<EncodedFilters> {
    filters
        .iter()
        .map(|(column, value)| {
            scalar_text(column, value).map(|text| (column.clone(), format!("eq.{text}")))
        })
        .collect()
}

fn scalar_text(column: &str, value: &Value) -> Result<String> {
    match value {
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ReadError::Encoding {
            column: column.to_string(),
            reason: format!("{} is not a scalar equality value", json_kind(other)),
        }),
    }
}
