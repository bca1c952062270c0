//! Table read requests: the raw tool arguments and the typed request built
//! from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::error::{ReadError, Result};

/// Column name → equality value, in document order.
pub type Filters = Map<String, Value>;

pub const DEFAULT_SELECT: &str = "*";
pub const DEFAULT_LIMIT: i64 = 100;

fn default_select() -> String {
    DEFAULT_SELECT.to_string()
}

fn default_filters_json() -> String {
    "{}".to_string()
}

const fn default_ascending() -> bool {
    true
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Arguments of the `read_table` tool, exactly as a caller sends them.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ReadTableArgs {
    /// Table name, e.g. 'public.kaggle_data' or 'kaggle_data'
    pub table: String,
    /// Columns to select, e.g. '*' or 'id,name'
    #[serde(default = "default_select")]
    pub select_cols: String,
    /// Equality filters as JSON, e.g. {"country":"FR"}
    #[serde(default = "default_filters_json")]
    pub filters_json: String,
    /// Column to order by (optional)
    #[serde(default)]
    pub order_by: String,
    /// Ascending sort if true
    #[serde(default = "default_ascending")]
    pub ascending: bool,
    /// Max rows (default 100)
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset (default 0)
    #[serde(default)]
    pub offset: i64,
}

impl ReadTableArgs {
    /// Arguments for `table` with every other field at its default.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select_cols: default_select(),
            filters_json: default_filters_json(),
            order_by: String::new(),
            ascending: true,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// A typed "read a table" request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table: String,
    pub select_columns: String,
    pub filters: Filters,
    pub order_by: Option<String>,
    pub ascending: bool,
    pub limit: i64,
    pub offset: i64,
}

impl QueryRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select_columns: default_select(),
            filters: Filters::new(),
            order_by: None,
            ascending: true,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select_columns = columns.into();
        self
    }

    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order_by = Some(column.into());
        self.ascending = ascending;
        self
    }

    #[must_use]
    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// The table name with any schema prefix removed: everything after the
    /// last `.`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::InvalidTable`] when nothing is left.
    pub fn effective_table(&self) -> Result<&str> {
        let name = self
            .table
            .rsplit_once('.')
            .map_or(self.table.as_str(), |(_, name)| name);
        if name.is_empty() {
            return Err(ReadError::InvalidTable(self.table.clone()));
        }
        Ok(name)
    }
}

impl TryFrom<ReadTableArgs> for QueryRequest {
    type Error = ReadError;

    fn try_from(args: ReadTableArgs) -> Result<Self> {
        Ok(Self {
            filters: parse_filters(&args.filters_json)?,
            table: args.table,
            select_columns: args.select_cols,
            order_by: Some(args.order_by).filter(|c| !c.is_empty()),
            ascending: args.ascending,
            limit: args.limit,
            offset: args.offset,
        })
    }
}

/// Parse the serialized filter argument. An empty string means no filters.
///
/// Integers too wide for 64 bits are kept as their exact digit string rather
/// than rounded to a float.
///
/// # Errors
///
/// Returns [`ReadError::MalformedFilters`] if the text is not JSON or is not
/// a JSON object.
pub fn parse_filters(filters_json: &str) -> Result<Filters> {
    if filters_json.is_empty() {
        return Ok(Filters::new());
    }
    match serde_json::from_str::<Value>(filters_json) {
        Ok(Value::Object(mut map)) => {
            keep_exact_integers(filters_json, &mut map)?;
            Ok(map)
        }
        Ok(other) => Err(ReadError::MalformedFilters(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ReadError::MalformedFilters(e.to_string())),
    }
}

fn keep_exact_integers(filters_json: &str, filters: &mut Filters) -> Result<()> {
    if !filters.values().any(Value::is_f64) {
        return Ok(());
    }
    let raw: HashMap<String, Box<RawValue>> = serde_json::from_str(filters_json)
        .map_err(|e| ReadError::MalformedFilters(e.to_string()))?;
    for (column, value) in filters.iter_mut() {
        let Some(text) = raw.get(column).map(|r| r.get().trim()) else {
            continue;
        };
        if value.is_f64() && is_integer_literal(text) {
            *value = Value::String(text.to_string());
        }
    }
    Ok(())
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Short name of a JSON value's kind, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
