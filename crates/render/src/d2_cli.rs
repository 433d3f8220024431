//! [`DiagramBackend`] backed by the `d2` command line tool.
//!
//! Every compile gets its own scratch directory holding `input.d2`. The compiler
//! runs with that directory as its working directory and a relative input path,
//! so error messages are identical across requests for the same source.

use crate::backend::{CompileOutcome, CompiledDiagram, DiagramBackend, DiagramMetadata};
use crate::capability::find_executable;
use crate::error::{RenderError, Result};
use crate::format::AsciiMode;
use crate::process::{failure_message, run_tool};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const DEFAULT_D2_PROGRAM: &str = "d2";

const SOURCE_FILE: &str = "input.d2";

/// Fixed look of rendered diagrams.
#[derive(Debug, Clone, PartialEq, Eq)]
struct D2RenderOptions {
    sketch: bool,
    pad: u32,
    theme_id: u32,
    layout: String,
}

impl Default for D2RenderOptions {
    fn default() -> Self {
        Self {
            sketch: true,
            pad: 5,
            // "Grape soda"
            theme_id: 6,
            layout: "dagre".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct D2Cli {
    program: PathBuf,
    options: D2RenderOptions,
}

impl Default for D2Cli {
    fn default() -> Self {
        Self::new(DEFAULT_D2_PROGRAM)
    }
}

impl D2Cli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            options: D2RenderOptions::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        find_executable(&self.program).is_some()
    }

    fn command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(workdir);
        cmd
    }

    fn spawn_error(&self, err: io::Error) -> RenderError {
        if err.kind() == io::ErrorKind::NotFound {
            RenderError::Infrastructure(format!(
                "d2 executable '{}' not found; install d2 or set --d2-bin",
                self.program.display()
            ))
        } else {
            RenderError::Infrastructure(format!(
                "failed to run '{}': {err}",
                self.program.display()
            ))
        }
    }

    async fn render_to(&self, diagram: &CompiledDiagram, output: &str, args: &[String]) -> Result<Vec<u8>> {
        let mut cmd = self.command(diagram.scratch_dir());
        cmd.args(args).arg(SOURCE_FILE).arg(output);

        let result = run_tool(cmd, None).await.map_err(|err| self.spawn_error(err))?;
        if !result.status.success() {
            let message = failure_message("d2", &result);
            log::warn!("d2 render to {output} failed: {message}");
            return Err(RenderError::Infrastructure(message));
        }

        tokio::fs::read(diagram.scratch_dir().join(output))
            .await
            .map_err(|err| RenderError::Infrastructure(format!("d2 produced no {output}: {err}")))
    }
}

#[async_trait]
impl DiagramBackend for D2Cli {
    async fn compile(&self, source: &str) -> CompileOutcome {
        let scratch = match tempfile::Builder::new().prefix("d2-mcp-").tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                return CompileOutcome::Infra(RenderError::Infrastructure(format!(
                    "failed to create scratch directory: {err}"
                )));
            }
        };
        if let Err(err) = tokio::fs::write(scratch.path().join(SOURCE_FILE), source).await {
            return CompileOutcome::Infra(RenderError::Infrastructure(format!(
                "failed to stage diagram source: {err}"
            )));
        }

        let mut cmd = self.command(scratch.path());
        cmd.arg("validate").arg(SOURCE_FILE);
        let output = match run_tool(cmd, None).await {
            Ok(output) => output,
            Err(err) => return CompileOutcome::Infra(self.spawn_error(err)),
        };

        if !output.status.success() {
            let message = failure_message("d2", &output);
            log::debug!("d2 rejected diagram: {message}");
            return CompileOutcome::Invalid(message);
        }

        let diagnostics = String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("success:"))
            .map(ToString::to_string)
            .collect();

        CompileOutcome::Compiled(CompiledDiagram::new(
            scratch,
            source.to_string(),
            DiagramMetadata { diagnostics },
        ))
    }

    async fn render_svg(&self, diagram: &CompiledDiagram) -> Result<Vec<u8>> {
        let mut args = Vec::new();
        if self.options.sketch {
            args.push("--sketch".to_string());
        }
        args.push(format!("--pad={}", self.options.pad));
        args.push(format!("--theme={}", self.options.theme_id));
        args.push(format!("--layout={}", self.options.layout));
        self.render_to(diagram, "render.svg", &args).await
    }

    async fn render_ascii(&self, diagram: &CompiledDiagram, mode: AsciiMode) -> Result<Vec<u8>> {
        let args = [
            format!("--layout={}", self.options.layout),
            format!("--ascii-mode={mode}"),
        ];
        let output = format!("render-{mode}.txt");
        self.render_to(diagram, &output, &args).await
    }
}
