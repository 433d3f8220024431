use d2_render::{lenient_string, DiagramRequest};
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CompileD2Request {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(
        with = "Option<String>",
        description = "D2 source code to compile. Takes precedence over file_path."
    )]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(
        with = "Option<String>",
        description = "Path to a .d2 file to compile; used only when code is absent."
    )]
    pub file_path: Option<String>,
}

impl From<CompileD2Request> for DiagramRequest {
    fn from(request: CompileD2Request) -> Self {
        Self {
            code: request.code,
            file_path: request.file_path,
            ..Self::default()
        }
    }
}

/// The `format` description is rewritten at startup to list the formats this process supports.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct RenderD2Request {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(
        with = "Option<String>",
        description = "D2 source code to render. Takes precedence over file_path."
    )]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(
        with = "Option<String>",
        description = "Path to a .d2 file. With write-files enabled the output lands next to it."
    )]
    pub file_path: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>", description = "Optional output format override")]
    pub format: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(
        with = "Option<String>",
        description = "ASCII rendering mode when format is ascii: 'extended' (Unicode box drawing, default) or 'standard' (plain ASCII)"
    )]
    pub ascii_mode: Option<String>,
}

impl From<RenderD2Request> for DiagramRequest {
    fn from(request: RenderD2Request) -> Self {
        Self {
            code: request.code,
            file_path: request.file_path,
            format: request.format,
            ascii_mode: request.ascii_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_argument_types_become_absent() {
        let request: RenderD2Request = serde_json::from_value(json!({
            "code": 42,
            "file_path": "",
            "format": "SVG",
            "ascii_mode": null,
        }))
        .unwrap();
        let request = DiagramRequest::from(request);
        assert_eq!(request.code, None);
        assert_eq!(request.file_path, None);
        assert_eq!(request.format.as_deref(), Some("SVG"));
        assert_eq!(request.ascii_mode, None);
    }

    #[test]
    fn compile_request_ignores_render_only_fields() {
        let request: CompileD2Request =
            serde_json::from_value(json!({"code": "a -> b", "format": "png"})).unwrap();
        assert_eq!(DiagramRequest::from(request), DiagramRequest::from_code("a -> b"));
    }

    #[test]
    fn schema_keeps_every_field_optional() {
        let schema = serde_json::to_value(schemars::schema_for!(RenderD2Request)).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["code", "file_path", "format", "ascii_mode"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
        let required = schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(Vec::len)
            .unwrap_or(0);
        assert_eq!(required, 0);
    }
}
