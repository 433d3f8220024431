use crate::error::Result;
use crate::format::AsciiMode;
use async_trait::async_trait;
use std::path::Path;
use tempfile::TempDir;

/// Result of compiling one diagram source.
///
/// An invalid diagram is a normal answer for the client. A compiler that cannot
/// run is an operational fault and never reaches the client as diagram output.
#[derive(Debug)]
pub enum CompileOutcome {
    Compiled(CompiledDiagram),
    /// The diagram is invalid. Carries the compiler's message.
    Invalid(String),
    /// The compiler could not run at all.
    Infra(crate::RenderError),
}

/// Side information a backend reports next to a successful compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramMetadata {
    /// Non-fatal compiler diagnostics, one per line.
    pub diagnostics: Vec<String>,
}

/// An opaque, validated diagram owned by exactly one request.
///
/// Holds the request's scratch directory; dropping the diagram removes it.
#[derive(Debug)]
pub struct CompiledDiagram {
    scratch: TempDir,
    source: String,
    metadata: DiagramMetadata,
}

impl CompiledDiagram {
    pub fn new(scratch: TempDir, source: String, metadata: DiagramMetadata) -> Self {
        Self {
            scratch,
            source,
            metadata,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn metadata(&self) -> &DiagramMetadata {
        &self.metadata
    }
}

/// The diagram compiler and its vector / text-art renderers.
#[async_trait]
pub trait DiagramBackend: Send + Sync {
    async fn compile(&self, source: &str) -> CompileOutcome;

    async fn render_svg(&self, diagram: &CompiledDiagram) -> Result<Vec<u8>>;

    async fn render_ascii(&self, diagram: &CompiledDiagram, mode: AsciiMode) -> Result<Vec<u8>>;
}
