//! In-process stand-in for the d2 compiler, for tests that should not depend on
//! the real tool being installed.

use crate::backend::{CompileOutcome, CompiledDiagram, DiagramBackend, DiagramMetadata};
use crate::error::{RenderError, Result};
use crate::format::AsciiMode;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Sources containing this marker compile to a user error.
pub const INVALID_MARKER: &str = "!invalid";
/// Sources containing this marker make the compiler itself fail.
pub const INFRA_MARKER: &str = "!infra";
/// Sources containing this marker make rendering hang until cancelled.
pub const HANG_MARKER: &str = "!hang";

#[derive(Debug, Default)]
pub struct FakeBackend {
    compiles: AtomicUsize,
}

impl FakeBackend {
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiagramBackend for FakeBackend {
    async fn compile(&self, source: &str) -> CompileOutcome {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if source.contains(INFRA_MARKER) {
            return CompileOutcome::Infra(RenderError::Infrastructure(
                "failed to create text ruler".to_string(),
            ));
        }
        if source.contains(INVALID_MARKER) {
            return CompileOutcome::Invalid(format!("input.d2:1:1: invalid source {source:?}"));
        }
        let scratch = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => return CompileOutcome::Infra(RenderError::Infrastructure(err.to_string())),
        };
        CompileOutcome::Compiled(CompiledDiagram::new(
            scratch,
            source.to_string(),
            DiagramMetadata::default(),
        ))
    }

    async fn render_svg(&self, diagram: &CompiledDiagram) -> Result<Vec<u8>> {
        if diagram.source().contains(HANG_MARKER) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><!-- {} --></svg>",
            diagram.source()
        )
        .into_bytes())
    }

    async fn render_ascii(&self, diagram: &CompiledDiagram, mode: AsciiMode) -> Result<Vec<u8>> {
        Ok(format!("{mode}:{}", diagram.source()).into_bytes())
    }
}

/// Compile through `backend`, panicking unless the result is a diagram.
pub async fn compile_ok(backend: &dyn DiagramBackend, source: &str) -> CompiledDiagram {
    match backend.compile(source).await {
        CompileOutcome::Compiled(diagram) => diagram,
        other => panic!("expected {source:?} to compile, got {other:?}"),
    }
}
