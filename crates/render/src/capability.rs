use crate::error::ConfigError;
use crate::format::OutputFormat;
use std::fmt;
use std::path::{Path, PathBuf};

/// ImageMagick 7 ships `magick`; older installs only have `convert`.
pub const RASTER_TOOL_CANDIDATES: &[&str] = &["magick", "convert"];

/// Formats this process can actually deliver, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySet {
    formats: Vec<OutputFormat>,
    raster_tool: Option<String>,
}

impl CapabilitySet {
    /// Build a set from an ordered format list. Duplicates are dropped, order is kept.
    pub fn new(
        formats: Vec<OutputFormat>,
        raster_tool: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        Ok(Self {
            formats: unique,
            raster_tool,
        })
    }

    pub fn contains(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    pub fn first(&self) -> OutputFormat {
        self.formats[0]
    }

    /// Name of the rasterizer found at startup, if PNG output is enabled.
    pub fn raster_tool(&self) -> Option<&str> {
        self.raster_tool.as_deref()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.as_str()).collect()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

/// Probe the environment once. SVG and ASCII are always available; PNG needs ImageMagick.
pub fn detect() -> Result<CapabilitySet, ConfigError> {
    detect_with(|name| find_executable(name).is_some())
}

pub fn detect_with(mut is_available: impl FnMut(&str) -> bool) -> Result<CapabilitySet, ConfigError> {
    let raster_tool = RASTER_TOOL_CANDIDATES
        .iter()
        .find(|name| is_available(name))
        .map(|name| name.to_string());

    if raster_tool.is_none() {
        log::warn!(
            "PNG rendering disabled; install ImageMagick ('magick' or 'convert') to enable it."
        );
    }

    let formats = OutputFormat::ALL
        .into_iter()
        .filter(|format| *format != OutputFormat::Png || raster_tool.is_some())
        .collect();
    CapabilitySet::new(formats, raster_tool)
}

/// Resolve a program name against `PATH` the way a shell would. Paths are checked as-is.
pub fn find_executable(program: impl AsRef<Path>) -> Option<PathBuf> {
    let program = program.as_ref();
    if program.as_os_str().is_empty() {
        return None;
    }

    if program.is_absolute() || program.components().count() > 1 {
        return is_executable_file(program).then(|| program.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
        if cfg!(windows) {
            let candidate = candidate.with_extension("exe");
            if is_executable_file(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
