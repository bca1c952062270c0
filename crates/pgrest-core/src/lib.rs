//! # pgrest-core
//!
//! Core types shared by every pgrest crate:
//! - [`QueryRequest`] — a typed "read a table" request
//! - [`ReadTableArgs`] — the loosely-typed arguments a tool caller sends
//! - [`Envelope`] — the success-or-error shape returned to callers
//! - [`RestConfig`] — backend location, credential, and collision policy
//! - Error hierarchy ([`ReadError`], [`ConfigError`])

pub mod config;
pub mod envelope;
pub mod error;
pub mod request;

pub use config::{RestConfig, ReservedKeyPolicy};
pub use envelope::{Envelope, TablePage};
pub use error::{ConfigError, ReadError, Result};
pub use request::{Filters, QueryRequest, ReadTableArgs};
