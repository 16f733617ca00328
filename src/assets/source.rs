use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use base64::Engine as _;

use crate::foundation::error::{StudioError, StudioResult};

/// One input still, held as a `data:` URI exactly as it was ingested.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageAsset {
    /// Display name (usually the original file name).
    pub name: String,
    /// Encoded image bytes as a `data:<mime>;base64,<payload>` URI.
    pub data: String,
}

impl ImageAsset {
    /// Wrap already-encoded image bytes.
    pub fn from_bytes(name: impl Into<String>, media_type: &str, bytes: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            name: name.into(),
            data: format!("data:{media_type};base64,{payload}"),
        }
    }

    /// Read an image file, inferring the media type from its extension.
    pub fn from_path(path: &Path) -> StudioResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        Ok(Self::from_bytes(
            file_name_of(path),
            media_type_for_path(path),
            &bytes,
        ))
    }

    /// Media type declared by the `data:` URI header, if any.
    pub fn media_type(&self) -> Option<&str> {
        let header = self.data.strip_prefix("data:")?.split(',').next()?;
        let mime = header.split(';').next().unwrap_or_default();
        if mime.is_empty() { None } else { Some(mime) }
    }

    pub fn is_svg(&self) -> bool {
        self.media_type() == Some("image/svg+xml")
    }

    /// Decode the URI payload back into the encoded image bytes.
    pub fn decoded_bytes(&self) -> StudioResult<Vec<u8>> {
        parse_data_uri(&self.data)
            .map_err(|e| StudioError::decode(format!("image '{}': {e}", self.name)))
    }
}

/// Raw bytes of the optional soundtrack.
#[derive(Clone, Debug)]
pub struct AudioSource {
    /// Display name (usually the original file name).
    pub name: String,
    /// Undecoded container bytes (mp3, wav, ogg, ...).
    pub bytes: Arc<[u8]>,
}

impl AudioSource {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> StudioResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read audio '{}'", path.display()))?;
        Ok(Self::from_bytes(file_name_of(path), bytes))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn parse_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "not a data: URI".to_owned())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data: URI has no payload separator".to_owned())?;

    if header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| format!("invalid base64 payload: {e}"))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(s: &str) -> Result<Vec<u8>, String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .ok_or_else(|| "truncated percent escape".to_owned())?;
            let v = u8::from_str_radix(hex, 16)
                .map_err(|_| format!("invalid percent escape \"%{hex}\""))?;
            out.push(v);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
