use crate::config::Config;
use crate::dispatch::{Payload, RenderResult};
use crate::error::{RenderError, Result};
use crate::request::DiagramRequest;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::{Path, PathBuf};

const SOURCE_EXTENSION: &str = ".d2";

/// What the client receives for a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    /// Output was written next to the input file.
    Written(PathBuf),
    /// Text-art output, verbatim.
    Text(String),
    /// Binary output, base64 encoded.
    Image { data: String, media_type: &'static str },
}

impl Delivered {
    pub fn confirmation(path: &Path) -> String {
        format!("D2 diagram rendered to: {}", path.display())
    }
}

/// Output file for `input` rendered as `format`: same directory and stem, `.d2` replaced.
pub fn derive_output_path(input: &Path, format: &str) -> PathBuf {
    let base = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = base.strip_suffix(SOURCE_EXTENSION).unwrap_or(&base);

    let extension = match format {
        "png" => "png",
        "svg" => "svg",
        "ascii" => "txt",
        other => other,
    };

    input.with_file_name(format!("{stem}.{extension}"))
}

/// Hand a render result to the client: to disk when the policy allows it and the
/// request named a file, inline otherwise. A failed write is an error, never a
/// reason to fall back to inline output.
pub async fn deliver(
    result: RenderResult,
    request: &DiagramRequest,
    config: &Config,
) -> Result<Delivered> {
    if config.write_files() {
        if let Some(input) = request.source_file() {
            let target = derive_output_path(input, result.format.as_str());
            tokio::fs::write(&target, &result.bytes)
                .await
                .map_err(RenderError::Write)?;
            log::info!("wrote {} ({} bytes)", target.display(), result.bytes.len());
            return Ok(Delivered::Written(target));
        }
    }

    Ok(match result.payload {
        Payload::Text => Delivered::Text(String::from_utf8_lossy(&result.bytes).into_owned()),
        Payload::Binary => Delivered::Image {
            data: BASE64.encode(&result.bytes),
            media_type: result.media_type,
        },
    })
}
