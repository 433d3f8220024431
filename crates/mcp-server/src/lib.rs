//! d2-mcp: validate and render D2 diagrams over the Model Context Protocol.
//!
//! ## Tools
//!
//! - `compile-d2` - check D2 source (inline `code` or a `file_path`) for errors
//! - `render-d2` - render to png, svg or ascii, inline or next to the input file
//! - `fetch-d2-cheat-sheet` - Markdown quick reference for the D2 language
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "d2": {
//!       "command": "d2-mcp",
//!       "args": ["--image-type", "svg"]
//!     }
//!   }
//! }
//! ```

pub mod cli;
mod tools;
pub mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use d2_render::{D2Cli, DiagramBackend, Pipeline};
use std::sync::Arc;

pub use tools::D2Service;

pub async fn main_entry() -> Result<()> {
    // stdout belongs to the stdio transport.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = cli::Cli::parse();
    let settings = cli::Settings::from_cli(cli).context("invalid configuration")?;

    let d2 = D2Cli::new(&settings.d2_program);
    if !d2.is_available() {
        log::warn!(
            "d2 executable '{}' not found; compile and render requests will fail until it is installed",
            settings.d2_program.display()
        );
    }
    log::info!(
        "Rendering formats: {} (default {})",
        settings.render.capabilities(),
        settings.render.default_format()
    );

    let backend: Arc<dyn DiagramBackend> = Arc::new(d2);
    let mut pipeline = Pipeline::new(Arc::new(settings.render), backend);
    if let Some(limit) = settings.render_timeout {
        pipeline = pipeline.with_timeout(limit);
    }

    transport::serve(
        D2Service::new(pipeline),
        settings.transport,
        &settings.host,
        settings.port,
    )
    .await
}
