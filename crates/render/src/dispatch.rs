use crate::backend::{CompiledDiagram, DiagramBackend};
use crate::error::{RenderError, Result};
use crate::format::{FormatDecision, OutputFormat};
use crate::rasterize::Rasterizer;
use std::sync::Arc;

/// How the bytes of a [`RenderResult`] may be handed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Text,
    Binary,
}

/// Rendered output of one request. Consumed once by delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub media_type: &'static str,
    pub payload: Payload,
}

impl RenderResult {
    fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format,
            media_type: format.media_type(),
            payload: if format.is_text() {
                Payload::Text
            } else {
                Payload::Binary
            },
        }
    }
}

/// Routes a compiled diagram to the vector, text-art or raster renderer.
#[derive(Clone)]
pub struct Renderer {
    backend: Arc<dyn DiagramBackend>,
    rasterizer: Option<Rasterizer>,
}

impl Renderer {
    pub fn new(backend: Arc<dyn DiagramBackend>, rasterizer: Option<Rasterizer>) -> Self {
        Self {
            backend,
            rasterizer,
        }
    }

    pub async fn render(
        &self,
        diagram: &CompiledDiagram,
        decision: &FormatDecision,
    ) -> Result<RenderResult> {
        let bytes = match decision.format {
            OutputFormat::Ascii => {
                let mode = decision.ascii_mode.unwrap_or_default();
                self.backend.render_ascii(diagram, mode).await?
            }
            OutputFormat::Svg => self.backend.render_svg(diagram).await?,
            OutputFormat::Png => {
                let rasterizer = self.rasterizer.as_ref().ok_or_else(|| {
                    RenderError::ExternalTool(
                        "PNG rendering is disabled; install ImageMagick ('magick' or 'convert')"
                            .to_string(),
                    )
                })?;
                let svg = self.backend.render_svg(diagram).await?;
                rasterizer.rasterize(&svg).await?
            }
        };
        Ok(RenderResult::new(decision.format, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AsciiMode;
    use crate::testing::{compile_ok, FakeBackend};

    #[tokio::test]
    async fn ascii_uses_the_negotiated_mode() {
        let backend = Arc::new(FakeBackend::default());
        let renderer = Renderer::new(backend.clone(), None);
        let diagram = compile_ok(backend.as_ref(), "a -> b").await;

        let result = renderer
            .render(&diagram, &FormatDecision::new(OutputFormat::Ascii, AsciiMode::Standard))
            .await
            .unwrap();
        assert_eq!(result.media_type, "text/plain");
        assert_eq!(result.payload, Payload::Text);
        assert_eq!(String::from_utf8(result.bytes).unwrap(), "standard:a -> b");
    }

    #[tokio::test]
    async fn svg_is_returned_as_is() {
        let backend = Arc::new(FakeBackend::default());
        let renderer = Renderer::new(backend.clone(), None);
        let diagram = compile_ok(backend.as_ref(), "a -> b").await;

        let result = renderer
            .render(&diagram, &FormatDecision::new(OutputFormat::Svg, AsciiMode::Extended))
            .await
            .unwrap();
        assert_eq!(result.media_type, "image/svg+xml");
        assert_eq!(result.payload, Payload::Binary);
        assert!(result.bytes.starts_with(b"<svg"));
    }

    #[tokio::test]
    async fn png_without_rasterizer_is_an_external_tool_error() {
        let backend = Arc::new(FakeBackend::default());
        let renderer = Renderer::new(backend.clone(), None);
        let diagram = compile_ok(backend.as_ref(), "a -> b").await;

        let err = renderer
            .render(&diagram, &FormatDecision::new(OutputFormat::Png, AsciiMode::Extended))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::ExternalTool(_)));
    }
}
