use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    core::{Rgba8, ScaleRange},
    error::{ForgeError, ForgeResult},
};

/// Tunables for the compositing engine.
///
/// Every field has a default, so a config file only needs the values it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Radius (CSS px) around a corner or the rotate marker that counts as a handle hit.
    pub handle_radius: f64,
    /// Distance (CSS px) from the top edge to the rotate handle.
    pub rotate_handle_offset: f64,
    pub min_css_size: f64,
    pub max_css_size: f64,
    pub min_dpr: f64,
    pub max_dpr: f64,
    /// Scale given to a freshly added overlay.
    pub default_overlay_scale: f64,
    pub photo_scale: ScaleRange,
    /// Range enforced by corner drags and wheel zoom.
    pub overlay_drag_scale: ScaleRange,
    /// Range enforced by direct (slider) scale edits.
    pub overlay_slider_scale: ScaleRange,
    pub noise_tile_px: u32,
    pub noise_seed: u64,
    pub noise_max_alpha: f32,
    /// Number of recently used artifact identifiers remembered across sessions.
    pub history_len: usize,
    pub export_prefix: String,
    pub guide_color: Rgba8,
    pub border_color: Rgba8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handle_radius: 14.0,
            rotate_handle_offset: 24.0,
            min_css_size: 320.0,
            max_css_size: 720.0,
            min_dpr: 1.0,
            max_dpr: 2.0,
            default_overlay_scale: 60.0,
            photo_scale: ScaleRange::new(100.0, 300.0),
            overlay_drag_scale: ScaleRange::new(10.0, 300.0),
            overlay_slider_scale: ScaleRange::new(10.0, 200.0),
            noise_tile_px: 128,
            noise_seed: 0x5EED_F00D,
            noise_max_alpha: 0.5,
            history_len: 400,
            export_prefix: "pfp".to_string(),
            guide_color: Rgba8::opaque(0, 255, 255),
            border_color: Rgba8::opaque(0, 255, 255),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file, then apply environment overrides and validate.
    pub fn from_json_file(path: &Path) -> ForgeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        let cfg = cfg.with_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `LAYERFORGE_EXPORT_PREFIX` and `LAYERFORGE_HISTORY_LEN` when set.
    pub fn with_env_overrides(mut self) -> ForgeResult<Self> {
        if let Ok(prefix) = std::env::var("LAYERFORGE_EXPORT_PREFIX")
            && !prefix.trim().is_empty()
        {
            self.export_prefix = prefix.trim().to_string();
        }
        if let Ok(raw) = std::env::var("LAYERFORGE_HISTORY_LEN") {
            self.history_len = raw.trim().parse::<usize>().map_err(|e| {
                ForgeError::validation(format!("LAYERFORGE_HISTORY_LEN '{raw}': {e}"))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> ForgeResult<()> {
        if !(self.handle_radius.is_finite() && self.handle_radius > 0.0) {
            return Err(ForgeError::validation("handle_radius must be > 0"));
        }
        if !(self.min_css_size > 0.0 && self.min_css_size <= self.max_css_size) {
            return Err(ForgeError::validation(
                "css size range must satisfy 0 < min <= max",
            ));
        }
        if !(self.min_dpr > 0.0 && self.min_dpr <= self.max_dpr) {
            return Err(ForgeError::validation(
                "dpr range must satisfy 0 < min <= max",
            ));
        }
        for (name, r) in [
            ("photo_scale", self.photo_scale),
            ("overlay_drag_scale", self.overlay_drag_scale),
            ("overlay_slider_scale", self.overlay_slider_scale),
        ] {
            if !(r.min > 0.0 && r.min <= r.max) {
                return Err(ForgeError::validation(format!(
                    "{name} must satisfy 0 < min <= max"
                )));
            }
        }
        if !self.overlay_drag_scale.contains(self.default_overlay_scale) {
            return Err(ForgeError::validation(
                "default_overlay_scale must lie inside overlay_drag_scale",
            ));
        }
        if self.noise_tile_px == 0 {
            return Err(ForgeError::validation("noise_tile_px must be > 0"));
        }
        if self.export_prefix.is_empty()
            || self
                .export_prefix
                .chars()
                .any(|c| c == '/' || c == '\\' || c.is_control())
        {
            return Err(ForgeError::validation(
                "export_prefix must be a non-empty file name fragment",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
