use clap::Parser;
use d2_render::{detect, AsciiMode, CapabilitySet, Config, ConfigError, OutputFormat, DEFAULT_D2_PROGRAM};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Every option can also come from the environment; an explicit flag wins.
#[derive(Parser, Debug, Clone)]
#[command(name = "d2-mcp")]
#[command(about = "MCP server that validates and renders D2 diagrams", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Transport to serve on: stdio, sse or http
    #[arg(long, env = "MCP_TRANSPORT")]
    pub transport: Option<String>,

    /// Deprecated: same as `--transport sse`
    #[arg(long, env = "SSE_MODE", value_parser = legacy_switch)]
    pub sse: bool,

    /// Address to bind for the sse/http transports
    #[arg(long, env = "MCP_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on for the sse/http transports [default: 8080]
    #[arg(long, env = "MCP_PORT")]
    pub port: Option<u16>,

    /// Deprecated alias of `--port`
    #[arg(long = "sse-port", env = "SSE_PORT", hide = true)]
    pub legacy_port: Option<u16>,

    /// Default output format (png, svg, ascii)
    #[arg(long, env = "D2_IMAGE_TYPE", default_value = "png")]
    pub image_type: String,

    /// Default ASCII rendering mode when format is ascii (extended, standard)
    #[arg(long, env = "D2_ASCII_MODE", default_value = "extended")]
    pub ascii_mode: String,

    /// Write output files next to `file_path` inputs instead of returning them inline
    #[arg(long, env = "D2_WRITE_FILES", value_parser = legacy_switch)]
    pub write_files: bool,

    /// d2 executable to compile and render with
    #[arg(long, env = "D2_BIN", default_value = DEFAULT_D2_PROGRAM)]
    pub d2_bin: PathBuf,

    /// Per-request time limit in seconds (0 disables it)
    #[arg(long, env = "D2_RENDER_TIMEOUT_SECS", default_value_t = 60)]
    pub render_timeout_secs: u64,
}

pub const DEFAULT_PORT: u16 = 8080;

/// Boolean switches read from the environment are on only for `true`, in any case.
fn legacy_switch(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

/// `--port` / `MCP_PORT` wins over the deprecated `SSE_PORT`.
fn resolve_port(port: Option<u16>, legacy_port: Option<u16>) -> u16 {
    match (port, legacy_port) {
        (Some(port), _) => port,
        (None, Some(port)) => {
            log::warn!("SSE_PORT is deprecated; use --port (MCP_PORT)");
            port
        }
        (None, None) => DEFAULT_PORT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Sse,
    Http,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::Http => "http",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "http" | "streamable-http" => Ok(Self::Http),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

/// Transport precedence, evaluated once:
///
/// | `--sse` / `SSE_MODE` | `--transport` / `MCP_TRANSPORT` | result    |
/// |----------------------|---------------------------------|-----------|
/// | set                  | any valid value or unset        | sse       |
/// | unset                | set                             | its value |
/// | unset                | unset                           | stdio     |
///
/// An invalid transport name is rejected even when the legacy flag would override it.
pub fn resolve_transport(legacy_sse: bool, transport: Option<&str>) -> Result<Transport, ConfigError> {
    let requested = transport
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse::<Transport>)
        .transpose()?;

    if legacy_sse {
        log::warn!("--sse / SSE_MODE is deprecated; use --transport sse (MCP_TRANSPORT=sse)");
        return Ok(Transport::Sse);
    }
    Ok(requested.unwrap_or(Transport::Stdio))
}

/// Validated process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub d2_program: PathBuf,
    pub render_timeout: Option<Duration>,
    pub render: Config,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_cli_with(cli, detect)
    }

    /// Validate flags first, then probe the environment. Nothing is served on error.
    pub fn from_cli_with(
        cli: Cli,
        detect: impl FnOnce() -> Result<CapabilitySet, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let default_format = cli.image_type.parse::<OutputFormat>()?;
        let default_mode = AsciiMode::from_config(&cli.ascii_mode)?;
        let transport = resolve_transport(cli.sse, cli.transport.as_deref())?;

        let capabilities = detect()?;
        let render = Config::new(capabilities, default_format, default_mode, cli.write_files);

        Ok(Self {
            transport,
            host: cli.host,
            port: resolve_port(cli.port, cli.legacy_port),
            d2_program: cli.d2_bin,
            render_timeout: (cli.render_timeout_secs > 0)
                .then(|| Duration::from_secs(cli.render_timeout_secs)),
            render,
        })
    }
}
