//! QueryRequest → PostgREST path segment and query parameters.
//!
//! Parameters come out in wire order: `select`, `limit`, `offset`, the
//! optional `order`, then one `<col>=eq.<value>` pair per filter.

use std::borrow::Cow;

use pgrest_core::{QueryRequest, ReadError, ReservedKeyPolicy, Result};

use crate::filters::encode_filters;

/// Query parameter names the reader sets itself.
pub const RESERVED_PARAMS: [&str; 4] = ["select", "limit", "offset", "order"];

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRead {
    /// Table name with the schema prefix removed.
    pub table: String,
    /// `table`, percent-encoded as a single path segment.
    pub path_segment: String,
    /// Query parameters in wire order.
    pub params: Vec<(String, String)>,
}

impl CompiledRead {
    /// Value of the first parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Compile a request into its wire form.
///
/// `limit` is clamped to at least 1 and `offset` to at least 0. Filters named
/// like a [reserved parameter](RESERVED_PARAMS) either replace it in place or
/// fail the read, depending on `policy`.
///
/// # Errors
///
/// Returns [`ReadError::InvalidTable`] for an empty table name,
/// [`ReadError::Encoding`] for non-scalar filter values, and
/// [`ReadError::ReservedFilterKey`] on a collision under
/// [`ReservedKeyPolicy::Reject`].
pub fn compile(request: &QueryRequest, policy: ReservedKeyPolicy) -> Result<CompiledRead> {
    let table = request.effective_table()?;

    let mut params = vec![
        ("select".to_string(), request.select_columns.clone()),
        ("limit".to_string(), request.limit.max(1).to_string()),
        ("offset".to_string(), request.offset.max(0).to_string()),
    ];
    if let Some(column) = request.order_by.as_deref().filter(|c| !c.is_empty()) {
        let direction = if request.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{column}.{direction}")));
    }

    for (column, value) in encode_filters(&request.filters)? {
        if !RESERVED_PARAMS.contains(&column.as_str()) {
            params.push((column, value));
            continue;
        }
        if policy == ReservedKeyPolicy::Reject {
            return Err(ReadError::ReservedFilterKey(column));
        }
        tracing::warn!(column = %column, "filter overrides reserved query parameter");
        match params.iter_mut().find(|(k, _)| *k == column) {
            Some(slot) => slot.1 = value,
            None => params.push((column, value)),
        }
    }

    Ok(CompiledRead {
        table: table.to_string(),
        path_segment: encode_segment(table).into_owned(),
        params,
    })
}

/// Percent-encode everything outside the unreserved set, `/` included.
fn encode_segment(table: &str) -> Cow<'_, str> {
    urlencoding::encode(table)
}
