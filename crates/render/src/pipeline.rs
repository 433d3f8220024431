use crate::backend::{CompileOutcome, CompiledDiagram, DiagramBackend, DiagramMetadata};
use crate::config::Config;
use crate::delivery::{deliver, Delivered};
use crate::dispatch::Renderer;
use crate::error::{RenderError, Result};
use crate::format::negotiate;
use crate::rasterize::Rasterizer;
use crate::request::{DiagramRequest, Operation};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-request progress. Any stage may end the request with an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    SourceResolved,
    FormatResolved,
    Compiled,
    Rendered,
    Delivered,
}

fn enter(op: Operation, stage: Stage) {
    log::debug!("{op}: {stage:?}");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileReport {
    Compiled(DiagramMetadata),
    /// The diagram is invalid; the message goes back to the client as content.
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderReport {
    Delivered(Delivered),
    Invalid(String),
}

/// Compile and render requests against one immutable [`Config`].
///
/// Cheap to clone and safe to share between concurrent requests: nothing in
/// here is mutated after construction.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<Config>,
    backend: Arc<dyn DiagramBackend>,
    renderer: Renderer,
    timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(config: Arc<Config>, backend: Arc<dyn DiagramBackend>) -> Self {
        let rasterizer = config.capabilities().raster_tool().map(Rasterizer::new);
        Self {
            renderer: Renderer::new(backend.clone(), rasterizer),
            config,
            backend,
            timeout: None,
        }
    }

    /// Upper bound for one request, on top of the caller's own cancellation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn compile(
        &self,
        request: &DiagramRequest,
        cancel: &CancellationToken,
    ) -> Result<CompileReport> {
        self.guard(Operation::Compile, cancel, self.compile_inner(request))
            .await
    }

    pub async fn render(
        &self,
        request: &DiagramRequest,
        cancel: &CancellationToken,
    ) -> Result<RenderReport> {
        self.guard(Operation::Render, cancel, self.render_inner(request))
            .await
    }

    async fn compile_inner(&self, request: &DiagramRequest) -> Result<CompileReport> {
        let op = Operation::Compile;
        enter(op, Stage::Received);
        let source = request.resolve_source().await?;
        enter(op, Stage::SourceResolved);

        Ok(match self.compile_source(op, &source).await? {
            Ok(diagram) => CompileReport::Compiled(diagram.metadata().clone()),
            Err(message) => CompileReport::Invalid(message),
        })
    }

    async fn render_inner(&self, request: &DiagramRequest) -> Result<RenderReport> {
        let op = Operation::Render;
        enter(op, Stage::Received);
        let source = request.resolve_source().await?;
        enter(op, Stage::SourceResolved);

        let decision = negotiate(
            request.format.as_deref(),
            request.ascii_mode.as_deref(),
            &self.config,
        )?;
        enter(op, Stage::FormatResolved);

        let diagram = match self.compile_source(op, &source).await? {
            Ok(diagram) => diagram,
            Err(message) => return Ok(RenderReport::Invalid(message)),
        };

        let result = self.renderer.render(&diagram, &decision).await?;
        drop(diagram);
        enter(op, Stage::Rendered);

        let delivered = deliver(result, request, &self.config).await?;
        enter(op, Stage::Delivered);
        Ok(RenderReport::Delivered(delivered))
    }

    /// Outer `Err` aborts the request, inner `Err` is the diagram's own error message.
    async fn compile_source(
        &self,
        op: Operation,
        source: &str,
    ) -> Result<std::result::Result<CompiledDiagram, String>> {
        match self.backend.compile(source).await {
            CompileOutcome::Compiled(diagram) => {
                enter(op, Stage::Compiled);
                Ok(Ok(diagram))
            }
            CompileOutcome::Invalid(message) => Ok(Err(message)),
            CompileOutcome::Infra(err) => Err(err),
        }
    }

    async fn guard<T>(
        &self,
        op: Operation,
        cancel: &CancellationToken,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(result) => result,
                    Err(_) => Err(RenderError::Cancelled(format!(
                        "{op} timed out after {:?}",
                        limit
                    ))),
                },
                None => work.await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RenderError::Cancelled(format!("{op} cancelled by client"))),
            result = bounded => result,
        };

        if let Err(err) = &result {
            log::warn!("{op} failed: {err}");
        }
        result
    }
}
