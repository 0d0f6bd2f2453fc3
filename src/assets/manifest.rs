//! Overlay catalog backed by an externally hosted manifest.

use std::path::Path;

use crate::foundation::error::{ForgeError, ForgeResult};

/// Filenames offered when no manifest can be read.
pub const DEFAULT_OVERLAY_FILES: &[&str] = &[
    "hat.png",
    "shades.png",
    "chain.png",
    "laser-eyes.png",
    "crown.png",
    "halo.png",
];

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
enum ManifestItem {
    Name(String),
    Entry { file: String },
}

#[derive(Clone, Debug, serde::Deserialize)]
struct Manifest {
    items: Vec<ManifestItem>,
}

/// One selectable overlay source.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OverlaySource {
    pub file: String,
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct OverlayCatalog {
    sources: Vec<OverlaySource>,
    fallback: bool,
}

impl OverlayCatalog {
    /// Parse a manifest document. Entries with empty file names are dropped.
    pub fn from_json(base_url: &str, text: &str) -> ForgeResult<Self> {
        let manifest: Manifest = serde_json::from_str(text)
            .map_err(|e| ForgeError::decode(format!("overlay manifest: {e}")))?;
        let files: Vec<String> = manifest
            .items
            .into_iter()
            .map(|item| match item {
                ManifestItem::Name(s) => s,
                ManifestItem::Entry { file } => file,
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if files.is_empty() {
            return Err(ForgeError::decode("overlay manifest lists no items"));
        }
        Ok(Self::from_files(base_url, files, false))
    }

    /// Read a manifest file, falling back to [`DEFAULT_OVERLAY_FILES`] on any failure.
    pub fn from_path(base_url: &str, path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::decode(format!("read '{}': {e}", path.display())))
            .and_then(|text| Self::from_json(base_url, &text));
        match loaded {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "overlay manifest unavailable, using defaults");
                Self::defaults(base_url)
            }
        }
    }

    pub fn defaults(base_url: &str) -> Self {
        Self::from_files(
            base_url,
            DEFAULT_OVERLAY_FILES.iter().map(|s| s.to_string()),
            true,
        )
    }

    fn from_files(base_url: &str, files: impl IntoIterator<Item = String>, fallback: bool) -> Self {
        let sources = files
            .into_iter()
            .map(|file| OverlaySource {
                url: asset_url(base_url, &file),
                file,
            })
            .collect();
        Self { sources, fallback }
    }

    pub fn sources(&self) -> &[OverlaySource] {
        &self.sources
    }

    /// True when the catalog came from the built-in default list.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Join a base location and a file name with exactly one separator.
/// Files that already carry a scheme are returned unchanged.
pub fn asset_url(base: &str, file: &str) -> String {
    if file.contains("://") {
        return file.to_string();
    }
    let base = base.trim_end_matches('/');
    let file = file.trim_start_matches('/');
    if base.is_empty() {
        file.to_string()
    } else {
        format!("{base}/{file}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
