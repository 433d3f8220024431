use crate::capability::find_executable;
use crate::error::{RenderError, Result};
use crate::process::{failure_message, run_tool};
use tokio::process::Command;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// SVG to PNG conversion through ImageMagick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rasterizer {
    tool: String,
}

impl Rasterizer {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// The tool is looked up again on every call: it was present at startup, but the
    /// environment may have changed since.
    pub async fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>> {
        let Some(program) = find_executable(&self.tool) else {
            return Err(RenderError::ExternalTool(format!(
                "'{}' is no longer available on PATH; install ImageMagick to render PNG",
                self.tool
            )));
        };

        let mut cmd = Command::new(program);
        cmd.args(["-background", "none", "svg:-", "png:-"]);
        let output = run_tool(cmd, Some(svg))
            .await
            .map_err(|err| RenderError::ExternalTool(format!("failed to run '{}': {err}", self.tool)))?;

        if !output.status.success() {
            return Err(RenderError::ExternalTool(failure_message(&self.tool, &output)));
        }
        if !output.stdout.starts_with(PNG_SIGNATURE) {
            return Err(RenderError::ExternalTool(format!(
                "'{}' did not produce a PNG image",
                self.tool
            )));
        }
        Ok(output.stdout)
    }
}
