use super::catalog::{COMPILE_TOOL, RENDER_TOOL};
use super::cheat_sheet::CHEAT_SHEET;
use super::error::{compile_result, render_result, to_error_data};
use super::listing::CapabilityToolRouter;
use super::schemas::{CompileD2Request, RenderD2Request};
use super::D2Service;
use d2_render::{CapabilitySet, DiagramRequest};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_router, ErrorData as McpError};

pub(super) fn build_tool_router(capabilities: &CapabilitySet) -> CapabilityToolRouter<D2Service> {
    CapabilityToolRouter::new(D2Service::tool_router(), capabilities)
}

#[tool_router(vis = "pub(super)")]
impl D2Service {
    #[tool(
        name = "compile-d2",
        description = "Compile D2 code to validate and check for errors"
    )]
    pub async fn compile_d2(
        &self,
        Parameters(request): Parameters<CompileD2Request>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let request = DiagramRequest::from(request);
        self.pipeline
            .compile(&request, &context.ct)
            .await
            .map(compile_result)
            .map_err(|err| to_error_data(COMPILE_TOOL, &err, self.pipeline.config()))
    }

    /// The description is replaced at startup with one naming the detected formats.
    #[tool(name = "render-d2", description = "Render a D2 diagram")]
    pub async fn render_d2(
        &self,
        Parameters(request): Parameters<RenderD2Request>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let request = DiagramRequest::from(request);
        self.pipeline
            .render(&request, &context.ct)
            .await
            .map(render_result)
            .map_err(|err| to_error_data(RENDER_TOOL, &err, self.pipeline.config()))
    }

    #[tool(
        name = "fetch-d2-cheat-sheet",
        description = "Returns a Markdown quick reference with common shapes, styling tips, and example snippets for D2."
    )]
    pub async fn fetch_d2_cheat_sheet(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(CHEAT_SHEET)]))
    }
}
