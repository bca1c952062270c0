//! MCP tool definitions for PostgREST table reads.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::Deserialize;

use pgrest_core::ReadTableArgs;
use pgrest_query::TableReader;

/// MCP server exposing read-only table access.
#[derive(Debug, Clone)]
pub struct PgrestMcpService {
    reader: TableReader,
    tool_router: ToolRouter<Self>,
}

impl PgrestMcpService {
    /// Create a server that reads through `reader`.
    pub fn new(reader: TableReader) -> Self {
        Self {
            reader,
            tool_router: Self::tool_router(),
        }
    }

    pub fn reader(&self) -> &TableReader {
        &self.reader
    }
}

/// Request for the echo tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EchoRequest {
    /// The text to echo
    pub text: String,
}

#[tool_router]
impl PgrestMcpService {
    /// Read rows from a table and return the JSON envelope.
    #[tool(
        description = "Read rows from a Postgres table via PostgREST with equality filters, \
                       ordering, and pagination. Returns {\"rows\": [...], \"count\": <int or null>} \
                       or {\"error\": \"...\"}"
    )]
    async fn read_table(&self, Parameters(args): Parameters<ReadTableArgs>) -> String {
        tracing::info!(table = %args.table, "read_table called");
        self.reader.read_args(args).await.to_json()
    }

    #[tool(description = "Echo the input text")]
    fn echo(&self, Parameters(req): Parameters<EchoRequest>) -> String {
        req.text
    }
}

#[tool_handler]
impl ServerHandler for PgrestMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PostgREST table reader. Use read_table to fetch rows with equality filters \
                 (filters_json), column selection, ordering, and limit/offset paging. \
                 Results carry the total row count when the backend reports it."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
