use rmcp::handler::server::tool::{ToolCallContext, ToolRouter};
use rmcp::model::{CallToolResult, ErrorCode, JsonObject, Tool};
use rmcp::ErrorData;
use serde_json::{json, Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

use super::catalog::{format_parameter_description, render_description, RENDER_TOOL};
use super::D2Service;
use d2_render::CapabilitySet;

/// Tool router whose listing reflects the detected capabilities and whose
/// argument-rejection errors say which arguments the tool accepts.
#[derive(Clone)]
pub(super) struct CapabilityToolRouter<S> {
    inner: ToolRouter<S>,
}

impl<S> CapabilityToolRouter<S>
where
    S: Send + Sync + 'static,
{
    pub(super) fn new(mut inner: ToolRouter<S>, capabilities: &CapabilitySet) -> Self {
        if let Some(route) = inner.map.get_mut(RENDER_TOOL) {
            advertise_formats(&mut route.attr, capabilities);
        }
        Self { inner }
    }

    pub(super) fn list_all(&self) -> Vec<Tool> {
        self.inner.list_all()
    }
}

impl CapabilityToolRouter<D2Service> {
    pub(super) async fn call(
        &self,
        context: ToolCallContext<'_, D2Service>,
    ) -> Result<CallToolResult, ErrorData> {
        let tool_name = context.name.to_string();

        match self.inner.call(context).await {
            Ok(result) => Ok(result),
            Err(err) => Err(enrich_invalid_params(&self.inner, &tool_name, err)),
        }
    }
}

fn advertise_formats(tool: &mut Tool, capabilities: &CapabilitySet) {
    tool.description = Some(Cow::Owned(render_description(capabilities)));

    let mut schema: JsonObject = tool.input_schema.as_ref().clone();
    let format = schema
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .map(|props| {
            props
                .entry("format")
                .or_insert_with(|| json!({ "type": "string" }))
        });
    if let Some(Value::Object(format)) = format {
        format.insert(
            "description".to_string(),
            Value::String(format_parameter_description(capabilities)),
        );
        format.insert("enum".to_string(), json!(capabilities.names()));
        // Omitting the field still selects the configured default.
        format.insert("type".to_string(), Value::String("string".to_string()));
    }
    tool.input_schema = Arc::new(schema);
}

/// Errors raised by the tools themselves carry a `kind` and are left alone.
fn enrich_invalid_params<S>(router: &ToolRouter<S>, tool_name: &str, mut err: ErrorData) -> ErrorData {
    if err.code != ErrorCode::INVALID_PARAMS || is_tool_error(&err) {
        return err;
    }

    let mut accepted: Vec<String> = router
        .map
        .get(tool_name)
        .and_then(|route| route.attr.input_schema.get("properties"))
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    accepted.sort();
    if accepted.is_empty() {
        return err;
    }

    let mut data = match err.data.take() {
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("detail".to_string(), other);
            map
        }
        None => Map::new(),
    };
    data.entry("tool")
        .or_insert_with(|| Value::String(tool_name.to_string()));
    data.insert("accepted".to_string(), json!(accepted));
    err.data = Some(Value::Object(data));

    let message = format!("{} (accepted parameters: {})", err.message, accepted.join(", "));
    err.message = Cow::Owned(message);
    err
}

fn is_tool_error(err: &ErrorData) -> bool {
    err.data
        .as_ref()
        .and_then(Value::as_object)
        .is_some_and(|data| data.contains_key("kind"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use d2_render::detect_with;

    fn render_tool() -> Tool {
        Tool::new(
            RENDER_TOOL,
            "placeholder",
            Arc::new(
                json!({
                    "type": "object",
                    "properties": {
                        "code": { "type": ["string", "null"] },
                        "format": { "type": ["string", "null"], "description": "Optional output format override" },
                    }
                })
                .as_object()
                .cloned()
                .unwrap(),
            ),
        )
    }

    #[test]
    fn format_enum_matches_capabilities() {
        let capabilities = detect_with(|_| false).unwrap();
        let mut tool = render_tool();
        advertise_formats(&mut tool, &capabilities);

        assert_eq!(
            tool.description.as_deref(),
            Some("Render a D2 diagram in svg, ascii format")
        );
        let format = &tool.input_schema["properties"]["format"];
        assert_eq!(format["enum"], json!(["svg", "ascii"]));
        assert_eq!(
            format["description"],
            json!("Optional output format override (svg, ascii)")
        );
        assert!(tool.input_schema["properties"]["code"].is_object());
    }

    #[test]
    fn argument_rejections_list_accepted_parameters() {
        let err = ErrorData::invalid_params("failed to deserialize parameters", None);
        let err = enrich_invalid_params(&D2Service::tool_router(), RENDER_TOOL, err);
        assert_eq!(
            err.message,
            "failed to deserialize parameters (accepted parameters: ascii_mode, code, file_path, format)"
        );
        let data = err.data.unwrap();
        assert_eq!(data["accepted"], json!(["ascii_mode", "code", "file_path", "format"]));
        assert_eq!(data["tool"], json!(RENDER_TOOL));
    }

    #[test]
    fn tool_errors_pass_through_unchanged() {
        let message = "unsupported format: gif (supported: svg, ascii)";
        let data = json!({ "tool": RENDER_TOOL, "kind": "unsupported_format" });
        let err = ErrorData::invalid_params(message, Some(data.clone()));
        let err = enrich_invalid_params(&D2Service::tool_router(), RENDER_TOOL, err);
        assert_eq!(err.message, message);
        assert_eq!(err.data, Some(data));
    }
}
