//! The one place where render outcomes become MCP results.

use d2_render::{CompileReport, Config, Delivered, RenderError, RenderReport};
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde_json::json;

pub(crate) const COMPILE_SUCCESS: &str = "D2 script compiled successfully";
const IMAGE_LABEL: &str = "D2 diagram";

fn kind(err: &RenderError) -> &'static str {
    match err {
        RenderError::MissingSource => "missing_source",
        RenderError::Read(_) | RenderError::Write(_) => "io",
        RenderError::UnsupportedFormat { .. } => "unsupported_format",
        RenderError::InvalidMode(_) => "invalid_mode",
        RenderError::Infrastructure(_) => "infrastructure",
        RenderError::ExternalTool(_) => "external_tool",
        RenderError::Cancelled(_) => "cancelled",
    }
}

pub(crate) fn to_error_data(tool: &str, err: &RenderError, config: &Config) -> ErrorData {
    let mut data = json!({ "tool": tool, "kind": kind(err) });
    if let RenderError::UnsupportedFormat { .. } = err {
        data["supported"] = json!(config.capabilities().names());
    }

    if err.is_client_error() {
        ErrorData::invalid_params(err.to_string(), Some(data))
    } else {
        ErrorData::internal_error(err.to_string(), Some(data))
    }
}

/// Diagram errors are ordinary results flagged as errors so the caller can fix the source.
fn diagram_error(message: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}

pub(crate) fn compile_result(report: CompileReport) -> CallToolResult {
    match report {
        CompileReport::Compiled(metadata) => {
            let mut content = vec![Content::text(COMPILE_SUCCESS)];
            content.extend(metadata.diagnostics.into_iter().map(Content::text));
            CallToolResult::success(content)
        }
        CompileReport::Invalid(message) => diagram_error(message),
    }
}

pub(crate) fn render_result(report: RenderReport) -> CallToolResult {
    match report {
        RenderReport::Delivered(Delivered::Written(path)) => {
            CallToolResult::success(vec![Content::text(Delivered::confirmation(&path))])
        }
        RenderReport::Delivered(Delivered::Text(text)) => {
            CallToolResult::success(vec![Content::text(text)])
        }
        RenderReport::Delivered(Delivered::Image { data, media_type }) => {
            CallToolResult::success(vec![
                Content::text(IMAGE_LABEL),
                Content::image(data, media_type),
            ])
        }
        RenderReport::Invalid(message) => diagram_error(message),
    }
}
