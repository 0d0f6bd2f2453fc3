//! File-picker and drag-and-drop inputs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{
    assets::{
        decode::sniff_raster,
        store::{ImageRef, ImageStore},
    },
    foundation::{
        error::{ForgeError, ForgeResult},
        math::Fnv1a64,
    },
};

/// Raw image payload handed to the engine by an upload surface.
#[derive(Clone, Debug)]
pub enum UploadInput {
    /// `data:<mime>;base64,<payload>` as produced by a file reader.
    DataUrl(String),
    /// Dropped bytes with an optional declared MIME type.
    Bytes {
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Decode an upload into `store`.
///
/// Returns `Ok(None)` for inputs that are not raster images; those are ignored without error.
pub fn ingest_upload(store: &mut ImageStore, input: UploadInput) -> ForgeResult<Option<ImageRef>> {
    let (mime, bytes) = match input {
        UploadInput::DataUrl(url) => match parse_data_url(&url)? {
            Some(parsed) => parsed,
            None => return Ok(None),
        },
        UploadInput::Bytes { mime, bytes } => (mime, bytes),
    };

    if let Some(m) = &mime
        && !is_image_mime(m)
    {
        tracing::debug!(mime = %m, "ignoring non-image upload");
        return Ok(None);
    }
    if !sniff_raster(&bytes) {
        tracing::debug!(len = bytes.len(), "ignoring upload with unknown signature");
        return Ok(None);
    }

    let label = upload_label(mime.as_deref(), &bytes);
    store.load_bytes(&label, &bytes).map(Some)
}

fn is_image_mime(m: &str) -> bool {
    m.trim().to_ascii_lowercase().starts_with("image/")
}

/// Split a data URL into its MIME type and decoded payload.
///
/// Strings that are not data URLs and non-image MIME types yield `Ok(None)`;
/// malformed image URLs are decode errors.
fn parse_data_url(url: &str) -> ForgeResult<Option<(Option<String>, Vec<u8>)>> {
    let Some(rest) = url.trim().strip_prefix("data:") else {
        tracing::debug!(len = url.len(), "ignoring dropped text that is not a data URL");
        return Ok(None);
    };
    let Some((meta, payload)) = rest.split_once(',') else {
        return Err(ForgeError::decode("data URL has no payload separator"));
    };
    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or("").trim().to_string();
    if !mime.is_empty() && !is_image_mime(&mime) {
        tracing::debug!(mime = %mime, "ignoring non-image data URL");
        return Ok(None);
    }
    if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(ForgeError::decode("image data URL must be base64 encoded"));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ForgeError::decode(format!("data URL payload: {e}")))?;
    let mime = if mime.is_empty() { None } else { Some(mime) };
    Ok(Some((mime, bytes)))
}

/// Identity for uploaded bytes: identical uploads share one cache entry.
fn upload_label(mime: Option<&str>, bytes: &[u8]) -> String {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(bytes);
    format!("upload:{}:{:016x}", mime.unwrap_or("image/*"), h.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/upload.rs"]
mod tests;
