use crate::config::Config;
use crate::error::{ConfigError, RenderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output formats the server knows how to produce, in advertisement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Svg,
    Ascii,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Svg, OutputFormat::Ascii];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Ascii => "ascii",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Ascii => "text/plain",
        }
    }

    /// Text output is delivered verbatim, everything else is base64 encoded.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Ascii)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "ascii" => Ok(Self::Ascii),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

/// Character set used by the text-art renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsciiMode {
    /// Unicode box-drawing glyphs.
    #[default]
    Extended,
    /// Plain ASCII connectors.
    Standard,
}

impl AsciiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extended => "extended",
            Self::Standard => "standard",
        }
    }

    /// Strict parser for startup configuration: only the canonical names are accepted.
    pub fn from_config(value: &str) -> std::result::Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "extended" => Ok(Self::Extended),
            "standard" => Ok(Self::Standard),
            _ => Err(ConfigError::InvalidMode(value.to_string())),
        }
    }
}

impl fmt::Display for AsciiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient request-side normalization, accepting the aliases clients tend to send.
pub fn normalize_mode(value: &str) -> Result<AsciiMode> {
    let mode = value.trim().to_ascii_lowercase();
    match mode.as_str() {
        "" | "extended" | "unicode" => Ok(AsciiMode::Extended),
        "standard" | "ascii" => Ok(AsciiMode::Standard),
        _ => Err(RenderError::InvalidMode(mode)),
    }
}

/// The negotiated output for one request. `ascii_mode` is only set for text-art output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDecision {
    pub format: OutputFormat,
    pub ascii_mode: Option<AsciiMode>,
}

impl FormatDecision {
    pub fn new(format: OutputFormat, mode: AsciiMode) -> Self {
        Self {
            format,
            ascii_mode: format.is_text().then_some(mode),
        }
    }
}

/// Resolve the requested format and mode against what this process can deliver.
///
/// Empty values fall back to the configured defaults. Format names are matched
/// case-insensitively; anything outside the capability set is rejected with the
/// list of formats that would have worked.
pub fn negotiate(
    requested_format: Option<&str>,
    requested_mode: Option<&str>,
    config: &Config,
) -> Result<FormatDecision> {
    let format = match requested_format.filter(|value| !value.is_empty()) {
        Some(raw) => {
            let lowered = raw.to_ascii_lowercase();
            let unsupported = || RenderError::UnsupportedFormat {
                requested: lowered.clone(),
                supported: config.capabilities().to_string(),
            };
            let format = lowered.parse::<OutputFormat>().map_err(|_| unsupported())?;
            if !config.capabilities().contains(format) {
                return Err(unsupported());
            }
            format
        }
        None => config.default_format(),
    };

    if !format.is_text() {
        return Ok(FormatDecision {
            format,
            ascii_mode: None,
        });
    }

    let mode = match requested_mode.filter(|value| !value.is_empty()) {
        Some(raw) => normalize_mode(raw)?,
        None => config.default_mode(),
    };
    Ok(FormatDecision::new(format, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilitySet;

    fn config_with(formats: &[OutputFormat]) -> Config {
        let capabilities = CapabilitySet::new(formats.to_vec(), None).expect("non-empty");
        Config::new(capabilities, OutputFormat::Svg, AsciiMode::Extended, false)
    }

    #[test]
    fn format_matching_ignores_case() {
        let config = config_with(&OutputFormat::ALL);
        for raw in ["PNG", "Png", "png"] {
            let decision = negotiate(Some(raw), None, &config).unwrap();
            assert_eq!(decision.format, OutputFormat::Png);
            assert_eq!(decision.ascii_mode, None);
        }
    }

    #[test]
    fn empty_format_uses_config_default() {
        let config = config_with(&OutputFormat::ALL);
        assert_eq!(
            negotiate(Some(""), None, &config).unwrap().format,
            OutputFormat::Svg
        );
        assert_eq!(negotiate(None, None, &config).unwrap().format, OutputFormat::Svg);
    }

    #[test]
    fn missing_png_lists_remaining_formats() {
        let config = config_with(&[OutputFormat::Svg, OutputFormat::Ascii]);
        let err = negotiate(Some("png"), None, &config).unwrap_err();
        match &err {
            RenderError::UnsupportedFormat { requested, supported } => {
                assert_eq!(requested, "png");
                assert_eq!(supported, "svg, ascii");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "unsupported format: png (supported: svg, ascii)"
        );
    }

    #[test]
    fn unknown_format_is_unsupported() {
        let config = config_with(&OutputFormat::ALL);
        let err = negotiate(Some("GIF"), None, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported format: gif (supported: png, svg, ascii)"
        );
    }

    #[test]
    fn mode_aliases_normalize() {
        assert_eq!(normalize_mode("").unwrap(), AsciiMode::Extended);
        assert_eq!(normalize_mode(" Unicode ").unwrap(), AsciiMode::Extended);
        assert_eq!(normalize_mode("STANDARD").unwrap(), AsciiMode::Standard);
        assert_eq!(normalize_mode("ascii").unwrap(), AsciiMode::Standard);
        assert!(matches!(
            normalize_mode("bogus"),
            Err(RenderError::InvalidMode(mode)) if mode == "bogus"
        ));
    }

    #[test]
    fn request_mode_overrides_default_only_for_ascii() {
        let capabilities = CapabilitySet::new(OutputFormat::ALL.to_vec(), None).unwrap();
        let config = Config::new(capabilities, OutputFormat::Ascii, AsciiMode::Standard, false);

        let decision = negotiate(None, None, &config).unwrap();
        assert_eq!(decision.ascii_mode, Some(AsciiMode::Standard));

        let decision = negotiate(Some("ascii"), Some("unicode"), &config).unwrap();
        assert_eq!(decision.ascii_mode, Some(AsciiMode::Extended));

        // Mode is ignored for non-text formats, even when invalid.
        let decision = negotiate(Some("svg"), Some("bogus"), &config).unwrap();
        assert_eq!(decision.ascii_mode, None);
    }

    #[test]
    fn invalid_request_mode_is_rejected_for_ascii() {
        let config = config_with(&OutputFormat::ALL);
        assert!(matches!(
            negotiate(Some("ascii"), Some("fancy"), &config),
            Err(RenderError::InvalidMode(_))
        ));
    }

    #[test]
    fn config_mode_parser_is_strict() {
        assert_eq!(AsciiMode::from_config("Standard").unwrap(), AsciiMode::Standard);
        assert_eq!(
            AsciiMode::from_config("unicode"),
            Err(ConfigError::InvalidMode("unicode".to_string()))
        );
    }
}
