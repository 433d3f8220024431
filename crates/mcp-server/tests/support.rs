#![allow(dead_code)]

use anyhow::{Context, Result};
use rmcp::model::{CallToolRequestParam, CallToolResult, ErrorData};
use rmcp::service::{RoleClient, RunningService, ServiceError};
use rmcp::{transport::TokioChildProcess, ServiceExt};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

pub const TIMEOUT: Duration = Duration::from_secs(20);

pub type Client = RunningService<RoleClient, ()>;

pub fn locate_d2_mcp_bin() -> Result<PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_d2-mcp") {
        return Ok(PathBuf::from(path));
    }

    // `.../target/{debug|release}/deps/<test>` -> `.../target/{debug|release}/d2-mcp`
    if let Ok(exe) = std::env::current_exe() {
        if let Some(target_profile_dir) = exe.parent().and_then(|p| p.parent()) {
            let candidate = target_profile_dir.join("d2-mcp");
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir
        .ancestors()
        .nth(2)
        .context("failed to resolve repo root from CARGO_MANIFEST_DIR")?;
    for rel in ["target/debug/d2-mcp", "target/release/d2-mcp"] {
        let candidate = repo_root.join(rel);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!("failed to locate d2-mcp binary; build with: cargo build -p d2-mcp")
}

/// Command for the server binary with a clean, deterministic environment.
pub fn server_command(args: &[&str]) -> Result<Command> {
    let mut cmd = Command::new(locate_d2_mcp_bin()?);
    for var in [
        "MCP_TRANSPORT",
        "SSE_MODE",
        "MCP_HOST",
        "MCP_PORT",
        "SSE_PORT",
        "D2_IMAGE_TYPE",
        "D2_ASCII_MODE",
        "D2_WRITE_FILES",
        "D2_BIN",
        "D2_RENDER_TIMEOUT_SECS",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd.args(args);
    Ok(cmd)
}

pub async fn start_server(args: &[&str]) -> Result<Client> {
    let transport = TokioChildProcess::new(server_command(args)?).context("spawn d2-mcp")?;
    tokio::time::timeout(TIMEOUT, ().serve(transport))
        .await
        .context("timeout starting d2-mcp")?
        .context("initialize d2-mcp")
}

pub async fn call(
    client: &Client,
    tool: &str,
    args: Value,
) -> Result<std::result::Result<CallToolResult, ErrorData>> {
    let outcome = tokio::time::timeout(
        TIMEOUT,
        client.call_tool(CallToolRequestParam {
            name: tool.to_string().into(),
            arguments: args.as_object().cloned(),
        }),
    )
    .await
    .with_context(|| format!("timeout calling {tool}"))?;

    match outcome {
        Ok(result) => Ok(Ok(result)),
        Err(ServiceError::McpError(err)) => Ok(Err(err)),
        Err(other) => Err(other).with_context(|| format!("transport failure calling {tool}")),
    }
}

pub fn first_text(result: &CallToolResult) -> Option<&str> {
    result
        .content
        .iter()
        .find_map(|c| c.as_text())
        .map(|t| t.text.as_str())
}

pub fn d2_available() -> bool {
    let found = d2_render::find_executable("d2").is_some();
    if !found {
        eprintln!("skipping: d2 not found on PATH");
    }
    found
}
