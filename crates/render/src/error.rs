use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Per-request failures. None of these are retried.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("either 'code' or 'file_path' parameter must be provided")]
    MissingSource,

    #[error("failed to read file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write output file: {0}")]
    Write(#[source] std::io::Error),

    #[error("unsupported format: {requested} (supported: {supported})")]
    UnsupportedFormat { requested: String, supported: String },

    #[error("invalid ASCII mode: {0}")]
    InvalidMode(String),

    /// The compile pipeline itself could not run. Unrelated to the diagram.
    #[error("d2 backend failure: {0}")]
    Infrastructure(String),

    /// The rasterization tool vanished or failed at call time.
    #[error("external tool failure: {0}")]
    ExternalTool(String),

    #[error("request cancelled: {0}")]
    Cancelled(String),
}

impl RenderError {
    /// Errors caused by what the client sent, as opposed to what the host could do.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSource | Self::UnsupportedFormat { .. } | Self::InvalidMode(_)
        )
    }
}

/// Startup-only failures. The process must not serve requests after one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid render format: {0}")]
    InvalidFormat(String),

    #[error("Invalid ASCII mode: {0}")]
    InvalidMode(String),

    #[error("Invalid transport: {0} (expected stdio, sse or http)")]
    InvalidTransport(String),

    #[error("No rendering formats available; ensure at least SVG support is enabled")]
    NoFormats,
}
