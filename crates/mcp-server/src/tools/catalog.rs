use d2_render::{CapabilitySet, OutputFormat};

pub(crate) const COMPILE_TOOL: &str = "compile-d2";
pub(crate) const RENDER_TOOL: &str = "render-d2";
pub(crate) const CHEAT_SHEET_TOOL: &str = "fetch-d2-cheat-sheet";

#[derive(Clone, Copy, Debug)]
pub(crate) struct ToolDescriptor {
    pub(crate) name: &'static str,
    pub(crate) summary: &'static str,
}

pub(crate) const TOOL_CATALOG: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: COMPILE_TOOL,
        summary: "Validate D2 source code or a .d2 file path. Run it before rendering large diagrams to surface syntax issues quickly.",
    },
    ToolDescriptor {
        name: RENDER_TOOL,
        summary: "Render a diagram. Override the format per call with \"format\"; set \"ascii_mode\" for ASCII output.",
    },
    ToolDescriptor {
        name: CHEAT_SHEET_TOOL,
        summary: "Markdown quick reference with common shapes, styling tips, and example snippets for D2.",
    },
];

/// Description of `render-d2` for the formats this process can actually produce.
pub(crate) fn render_description(capabilities: &CapabilitySet) -> String {
    format!("Render a D2 diagram in {capabilities} format")
}

pub(crate) fn format_parameter_description(capabilities: &CapabilitySet) -> String {
    format!("Optional output format override ({capabilities})")
}

pub(crate) fn tool_instructions(capabilities: &CapabilitySet) -> String {
    let mut lines = vec![
        "Use the d2-mcp server to validate and render D2 diagrams directly from your MCP client."
            .to_string(),
        String::new(),
        "Available tools:".to_string(),
    ];
    for tool in TOOL_CATALOG {
        lines.push(format!("- {}: {}", tool.name, tool.summary));
    }

    lines.push(String::new());
    lines.push("Usage tips:".to_string());
    lines.push(
        "- Provide either \"code\" (raw D2) or \"file_path\". When both are absent the tools return an error that can be shown to the user; when both are given, \"code\" wins."
            .to_string(),
    );
    lines.push(format!("- Formats available in this environment: {capabilities}."));
    if !capabilities.contains(OutputFormat::Png) {
        lines.push(
            "- PNG is disabled: it is only advertised when ImageMagick (\"magick\" or \"convert\") is on PATH."
                .to_string(),
        );
    }
    lines.push(
        "- ASCII output is ideal for LLM consumption; choose \"standard\" mode for pure ASCII connectors or \"extended\" for Unicode box drawing characters."
            .to_string(),
    );
    lines.push(
        "- The server supports stdio, SSE, and streamable HTTP transports (--transport stdio|sse|http or MCP_TRANSPORT)."
            .to_string(),
    );
    lines.join("\n")
}
