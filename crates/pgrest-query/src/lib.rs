//! # pgrest-query
//!
//! Translates table read requests into PostgREST queries and runs them.
//!
//! Includes:
//! - Equality filter encoder (`{"col": v}` → `col=eq.v`)
//! - Request compiler (schema stripping, pagination clamping, ordering,
//!   reserved parameter collisions)
//! - `Content-Range` total parsing
//! - [`TableReader`], which sends the GET and normalises the response

pub mod compiler;
pub mod filters;
pub mod range;
pub mod reader;

pub use compiler::{compile, CompiledRead, RESERVED_PARAMS};
pub use filters::{encode_filters, EncodedFilters};
pub use range::parse_total;
pub use reader::TableReader;
