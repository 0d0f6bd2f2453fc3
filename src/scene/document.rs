//! JSON description of a composition, for driving the engine without a UI.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::{
        core::{Transform, TransformPatch},
        error::{ForgeError, ForgeResult},
    },
    layers::model::{Adjustments, Focus},
    session::editor::Editor,
};

fn default_dpr() -> f64 {
    1.0
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayEntry {
    /// Image path, relative to the document directory.
    pub src: String,
    #[serde(default)]
    pub transform: Option<Transform>,
}

/// Photo, overlays (in insertion order, the last one stays active) and adjustments.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDocument {
    pub container: ContainerSize,
    #[serde(default = "default_dpr")]
    pub dpr: f64,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub photo_transform: Option<Transform>,
    #[serde(default)]
    pub overlays: Vec<OverlayEntry>,
    #[serde(default)]
    pub adjustments: Adjustments,
    #[serde(default)]
    pub focus: Option<Focus>,
}

impl SceneDocument {
    pub fn from_json(text: &str) -> ForgeResult<Self> {
        let doc: Self = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    #[tracing::instrument]
    pub fn from_path(path: &Path) -> ForgeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Directory image paths in a document at `path` resolve against.
    pub fn asset_root(path: &Path) -> PathBuf {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn validate(&self) -> ForgeResult<()> {
        let ContainerSize { width, height } = self.container;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ForgeError::validation("container size must be positive"));
        }
        if !(self.dpr.is_finite() && self.dpr > 0.0) {
            return Err(ForgeError::validation("dpr must be > 0"));
        }
        if self.overlays.iter().any(|o| o.src.trim().is_empty()) {
            return Err(ForgeError::validation("overlay src must be non-empty"));
        }
        Ok(())
    }

    /// Rebuild the composition in `editor`.
    ///
    /// The editor is reset first. Images that fail to load are skipped like any other
    /// asset failure.
    #[tracing::instrument(skip_all, fields(overlays = self.overlays.len()))]
    pub fn apply(&self, editor: &mut Editor) {
        editor.reset();
        editor.resize(self.container.width, self.container.height, self.dpr);

        if let Some(photo) = &self.photo
            && editor.load_photo_path(photo).is_some()
            && let Some(t) = self.photo_transform
        {
            editor.set_base_transform(TransformPatch {
                scale_percent: Some(t.scale_percent),
                offset: Some(t.offset),
                rotation_deg: None,
            });
        }

        for overlay in &self.overlays {
            if editor.add_overlay_path(&overlay.src).is_some()
                && let Some(t) = overlay.transform
            {
                let range = editor.config().overlay_drag_scale;
                editor.update_active_overlay(TransformPatch {
                    scale_percent: Some(range.clamp(t.scale_percent)),
                    offset: Some(t.offset),
                    rotation_deg: Some(t.rotation_deg),
                });
            }
        }

        editor.set_adjustments(self.adjustments);
        if let Some(focus) = self.focus {
            editor.set_focus(focus);
        }
        editor.on_frame();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;
