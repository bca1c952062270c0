//! MCP transports: stdio and streamable HTTP.

use anyhow::Context;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServiceExt;

use pgrest_mcp::PgrestMcpService;

/// Path the streamable HTTP endpoint is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// Serve over stdin/stdout until the client disconnects.
pub async fn stdio(service: PgrestMcpService) -> anyhow::Result<()> {
    tracing::info!("serving MCP over stdio");
    let running = service
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start stdio transport")?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

/// Serve streamable HTTP at `addr` until Ctrl-C.
///
/// Sessions are stateless: every request gets a fresh handler sharing the
/// same table reader.
pub async fn http(service: PgrestMcpService, addr: &str) -> anyhow::Result<()> {
    let mcp = StreamableHttpService::new(
        move || Ok(service.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );
    let router = axum::Router::new().nest_service(MCP_PATH, mcp);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, path = MCP_PATH, "serving MCP over streamable HTTP");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("http server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
