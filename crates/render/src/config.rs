use crate::capability::CapabilitySet;
use crate::format::{AsciiMode, OutputFormat};

/// Process-wide render settings. Built once at startup, shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    capabilities: CapabilitySet,
    default_format: OutputFormat,
    default_mode: AsciiMode,
    write_files: bool,
}

impl Config {
    /// A default format the environment cannot produce is replaced by the first
    /// available one, with a warning.
    pub fn new(
        capabilities: CapabilitySet,
        default_format: OutputFormat,
        default_mode: AsciiMode,
        write_files: bool,
    ) -> Self {
        let default_format = if capabilities.contains(default_format) {
            default_format
        } else {
            let fallback = capabilities.first();
            log::warn!(
                "default format {default_format} not available; falling back to {fallback}"
            );
            fallback
        };

        Self {
            capabilities,
            default_format,
            default_mode,
            write_files,
        }
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    pub fn default_mode(&self) -> AsciiMode {
        self.default_mode
    }

    /// Whether renders of `file_path` sources are written next to the input.
    pub fn write_files(&self) -> bool {
        self.write_files
    }
}
