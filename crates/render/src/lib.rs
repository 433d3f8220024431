//! # D2 Render
//!
//! Turns loosely typed compile/render requests into D2 diagrams.
//!
//! ## Architecture
//!
//! ```text
//! DiagramRequest
//!     │
//!     ├──> resolve_source      code wins over file_path
//!     ├──> negotiate           format + ASCII mode against the CapabilitySet
//!     ├──> DiagramBackend      compile: Compiled | Invalid | Infra
//!     ├──> Renderer            svg | ascii | svg -> Rasterizer -> png
//!     └──> deliver             write next to the input, or inline (text / base64)
//! ```
//!
//! [`Config`] and its [`CapabilitySet`] are built once at startup and only read
//! afterwards, so a [`Pipeline`] can serve any number of requests concurrently.

mod backend;
mod capability;
mod config;
mod d2_cli;
mod delivery;
mod dispatch;
mod error;
mod format;
mod pipeline;
mod process;
mod rasterize;
mod request;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use backend::{CompileOutcome, CompiledDiagram, DiagramBackend, DiagramMetadata};
pub use capability::{detect, detect_with, find_executable, CapabilitySet, RASTER_TOOL_CANDIDATES};
pub use config::Config;
pub use d2_cli::{D2Cli, DEFAULT_D2_PROGRAM};
pub use delivery::{deliver, derive_output_path, Delivered};
pub use dispatch::{Payload, RenderResult, Renderer};
pub use error::{ConfigError, RenderError, Result};
pub use format::{negotiate, normalize_mode, AsciiMode, FormatDecision, OutputFormat};
pub use pipeline::{CompileReport, Pipeline, RenderReport};
pub use rasterize::Rasterizer;
pub use request::{lenient_string, DiagramRequest};
