//! pgrest CLI — PostgREST table reads as MCP tools
//!
//! Commands: serve, read, completions

mod serve;

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use pgrest_core::{ReadTableArgs, RestConfig};
use pgrest_mcp::PgrestMcpService;
use pgrest_query::TableReader;

#[derive(Parser)]
#[command(name = "pgrest")]
#[command(version)]
#[command(about = "PostgREST table reads as MCP tools")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the MCP server (stdio unless --http is given)
    Serve {
        /// Serve streamable HTTP at /mcp instead of stdio
        #[arg(long)]
        http: bool,
        /// Interface to bind for --http
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to bind for --http
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
    /// Read a table once and print the result envelope
    #[command(alias = "r")]
    Read {
        /// Table name, optionally schema-qualified
        #[arg(long)]
        table: String,
        /// Columns to select
        #[arg(long, default_value = "*")]
        select: String,
        /// Equality filters as a JSON object
        #[arg(long, default_value = "{}")]
        filters: String,
        /// Column to order by
        #[arg(long, default_value = "")]
        order_by: String,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Max rows
        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        limit: i64,
        /// Rows to skip
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Serve { http, host, port }) => {
            let service = PgrestMcpService::new(reader_from_env()?);
            if http {
                serve::http(service, &format!("{host}:{port}")).await?;
            } else {
                serve::stdio(service).await?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Read {
            table,
            select,
            filters,
            order_by,
            desc,
            limit,
            offset,
        }) => {
            let reader = reader_from_env()?;
            let args = ReadTableArgs {
                table,
                select_cols: select,
                filters_json: filters,
                order_by,
                ascending: !desc,
                limit,
                offset,
            };
            let envelope = reader.read_args(args).await;
            println!("{}", envelope.to_json());
            Ok(if envelope.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "pgrest", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!(
                "pgrest v{} — PostgREST table reads as MCP tools",
                env!("CARGO_PKG_VERSION")
            );
            println!("Run `pgrest --help` for usage.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn reader_from_env() -> anyhow::Result<TableReader> {
    let config = RestConfig::from_env()?;
    tracing::debug!(
        base_url = config.base_url(),
        policy = %config.reserved_policy,
        "loaded backend configuration"
    );
    TableReader::new(config).context("failed to build HTTP client")
}

/// Logs go to stderr; stdout belongs to the stdio transport and `read`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pgrest={level},pgrest_core={level},pgrest_query={level},pgrest_mcp={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
