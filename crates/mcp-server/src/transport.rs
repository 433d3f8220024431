use crate::cli::Transport;
use crate::tools::D2Service;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServiceExt;
use std::time::Duration;

pub const MCP_PATH: &str = "/mcp";
const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

pub async fn serve(service: D2Service, transport: Transport, host: &str, port: u16) -> Result<()> {
    match transport {
        Transport::Stdio => serve_stdio(service).await,
        Transport::Http => serve_http(service, host, port, false).await,
        Transport::Sse => serve_http(service, host, port, true).await,
    }
}

async fn serve_stdio(service: D2Service) -> Result<()> {
    log::info!("Serving d2-mcp on stdio");
    let server = service
        .serve(stdio())
        .await
        .context("failed to start stdio transport")?;
    server.waiting().await?;
    log::info!("stdio client disconnected");
    Ok(())
}

/// Streamable HTTP at [`MCP_PATH`]. In session mode responses stream as
/// Server-Sent Events with periodic keep-alives.
async fn serve_http(service: D2Service, host: &str, port: u16, sessions: bool) -> Result<()> {
    let config = StreamableHttpServerConfig {
        stateful_mode: sessions,
        sse_keep_alive: sessions.then_some(SSE_KEEP_ALIVE),
        ..Default::default()
    };
    let mcp = StreamableHttpService::new(
        move || Ok(service.clone()),
        LocalSessionManager::default().into(),
        config,
    );

    let app = Router::new()
        .nest_service(MCP_PATH, mcp)
        .route("/health", get(|| async { "ok" }));

    let bind = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let mode = if sessions { "sse" } else { "http" };
    log::info!("Serving d2-mcp ({mode}) on http://{bind}{MCP_PATH}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http transport failed")?;
    log::info!("d2-mcp stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown requested");
}
