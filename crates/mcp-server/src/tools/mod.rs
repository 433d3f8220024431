//! D2 MCP tool surface.
//!
//! `router` declares the tools, `schemas` their arguments, `error` turns render
//! outcomes into MCP results and `listing` adapts the advertised tool list to the
//! formats this process can produce.

pub(crate) mod catalog;
mod cheat_sheet;
mod error;
mod listing;
mod router;
mod schemas;

use d2_render::Pipeline;
use listing::CapabilityToolRouter;
use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ServerHandler};

/// MCP service exposing `compile-d2`, `render-d2` and `fetch-d2-cheat-sheet`.
///
/// Clones share the same pipeline, so one value can back every session of an
/// HTTP transport.
#[derive(Clone)]
pub struct D2Service {
    pipeline: Pipeline,
    tool_router: CapabilityToolRouter<D2Service>,
}

impl D2Service {
    pub fn new(pipeline: Pipeline) -> Self {
        let tool_router = router::build_tool_router(pipeline.config().capabilities());
        Self {
            pipeline,
            tool_router,
        }
    }
}

fn server_identity() -> Implementation {
    Implementation {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ..Implementation::from_build_env()
    }
}

#[tool_handler]
impl ServerHandler for D2Service {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(catalog::tool_instructions(
                self.pipeline.config().capabilities(),
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: server_identity(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use d2_render::testing::FakeBackend;
    use d2_render::{detect_with, AsciiMode, Config, OutputFormat};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn service(png: bool) -> D2Service {
        let capabilities = detect_with(|name| png && name == "magick").unwrap();
        let config = Config::new(capabilities, OutputFormat::Png, AsciiMode::Extended, false);
        D2Service::new(Pipeline::new(Arc::new(config), Arc::new(FakeBackend::default())))
    }

    #[test]
    fn lists_every_tool_once() {
        let mut names: Vec<String> = service(true)
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["compile-d2", "fetch-d2-cheat-sheet", "render-d2"]
        );
    }

    #[test]
    fn render_tool_advertises_detected_formats() {
        let tools = service(false).tool_router.list_all();
        let render = tools
            .iter()
            .find(|tool| tool.name == catalog::RENDER_TOOL)
            .unwrap();
        assert_eq!(
            render.description.as_deref(),
            Some("Render a D2 diagram in svg, ascii format")
        );
        assert_eq!(
            render.input_schema["properties"]["format"]["enum"],
            serde_json::json!(["svg", "ascii"])
        );
    }

    #[test]
    fn server_info_carries_instructions() {
        let info = service(true).get_info();
        let instructions = info.instructions.unwrap();
        assert!(instructions.contains("png, svg, ascii"));
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "d2-mcp");
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }
}
