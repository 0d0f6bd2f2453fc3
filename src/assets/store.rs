use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::decode::decode_image,
    foundation::error::{ForgeError, ForgeResult},
    foundation::math::Fnv1a64,
};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Stable hashed identifier derived from an image's source identity.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Derive the identifier for a source string (path, URL or upload label).
    pub fn for_source(source: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_u8(b'i');
        h.write_bytes(source.as_bytes());
        Self(h.finish())
    }

    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Handle to a decoded image held by an [`ImageStore`].
///
/// Layers keep this instead of pixels; the renderer resolves it at draw time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub id: AssetId,
    pub width: u32,
    pub height: u32,
    pub source: Arc<str>,
}

/// Decoded images keyed by source identity.
///
/// Each source is decoded once; later loads of the same source return the cached handle,
/// so every render reads images synchronously and paint order never depends on decode timing.
#[derive(Debug, Default)]
pub struct ImageStore {
    root: Option<PathBuf>,
    images: HashMap<AssetId, (Arc<str>, PreparedImage)>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose relative paths resolve against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            images: HashMap::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Decode `bytes` under the identity `source`, or return the cached handle.
    pub fn load_bytes(&mut self, source: &str, bytes: &[u8]) -> ForgeResult<ImageRef> {
        let id = AssetId::for_source(source);
        if let Some(r) = self.image_ref(id) {
            return Ok(r);
        }
        let prepared = decode_image(bytes)
            .map_err(|e| ForgeError::decode(format!("image '{source}': {e}")))?;
        Ok(self.insert_prepared(source, prepared))
    }

    /// Read and decode an image file. Relative paths resolve against the store root.
    pub fn load_path(&mut self, rel: &str) -> ForgeResult<ImageRef> {
        let norm = normalize_rel_path(rel)?;
        let id = AssetId::for_source(&norm);
        if let Some(r) = self.image_ref(id) {
            return Ok(r);
        }
        let path = match &self.root {
            Some(root) if Path::new(&norm).is_relative() => root.join(&norm),
            _ => PathBuf::from(&norm),
        };
        let bytes =
            std::fs::read(&path).with_context(|| format!("read image '{}'", path.display()))?;
        self.load_bytes(&norm, &bytes)
    }

    /// Register an already decoded image, replacing any previous entry for `source`.
    pub fn insert_prepared(&mut self, source: &str, image: PreparedImage) -> ImageRef {
        let id = AssetId::for_source(source);
        let source: Arc<str> = Arc::from(source);
        let r = ImageRef {
            id,
            width: image.width,
            height: image.height,
            source: source.clone(),
        };
        self.images.insert(id, (source, image));
        r
    }

    /// Keep only the images for which `keep` returns `true`. Returns how many were evicted.
    pub fn retain(&mut self, mut keep: impl FnMut(AssetId) -> bool) -> usize {
        let before = self.images.len();
        self.images.retain(|id, _| keep(*id));
        before - self.images.len()
    }

    pub fn get(&self, id: AssetId) -> Option<&PreparedImage> {
        self.images.get(&id).map(|(_, img)| img)
    }

    pub fn image_ref(&self, id: AssetId) -> Option<ImageRef> {
        self.images.get(&id).map(|(source, img)| ImageRef {
            id,
            width: img.width,
            height: img.height,
            source: source.clone(),
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.images.keys().copied()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.images.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Normalize a slash-separated path: drop `.` segments, reject `..` escapes and empty input.
pub fn normalize_rel_path(p: &str) -> ForgeResult<String> {
    let p = p.trim().replace('\\', "/");
    if p.is_empty() {
        return Err(ForgeError::validation("image path must be non-empty"));
    }
    let absolute = p.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for seg in p.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(ForgeError::validation(format!(
                        "image path '{p}' escapes its root"
                    )));
                }
            }
            s => parts.push(s),
        }
    }
    if parts.is_empty() {
        return Err(ForgeError::validation(format!("image path '{p}' is empty")));
    }
    let joined = parts.join("/");
    Ok(if absolute { format!("/{joined}") } else { joined })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
