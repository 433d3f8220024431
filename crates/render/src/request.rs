use crate::error::{RenderError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Compile,
    Render,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compile => "compile",
            Self::Render => "render",
        })
    }
}

/// Arguments of a compile or render call.
///
/// Clients are loose about types, so every field tolerates non-string JSON
/// values by treating them as absent. Empty strings are absent too.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DiagramRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ascii_mode: Option<String>,
}

impl DiagramRequest {
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn from_file(path: impl Into<String>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = non_empty(Some(format.into()));
        self
    }

    /// The input file, but only when it is the effective source of the diagram.
    pub fn source_file(&self) -> Option<&Path> {
        if self.code.as_deref().is_some_and(|code| !code.is_empty()) {
            return None;
        }
        self.file_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(Path::new)
    }

    /// Resolve the diagram source. Literal code always wins; the file is only read without it.
    pub async fn resolve_source(&self) -> Result<String> {
        if let Some(code) = self.code.as_deref().filter(|code| !code.is_empty()) {
            return Ok(code.to_string());
        }

        match self.source_file() {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(RenderError::Read),
            None => Err(RenderError::MissingSource),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Deserialize a string field, mapping any non-string JSON value (and `""`) to `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(non_empty(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }))
}
