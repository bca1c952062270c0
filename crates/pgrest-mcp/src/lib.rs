//! # pgrest-mcp
//!
//! MCP (Model Context Protocol) server for PostgREST-backed tables.
//!
//! Exposes read-only operations as MCP tools:
//! - `read_table`: Read rows with equality filters, ordering, and pagination
//! - `echo`: Return the input text unchanged

pub mod tools;

pub use tools::PgrestMcpService;
