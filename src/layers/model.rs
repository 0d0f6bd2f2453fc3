use std::collections::HashSet;

use crate::{
    assets::store::{AssetId, ImageRef},
    foundation::{
        config::EngineConfig,
        core::{Transform, TransformPatch, Vec2},
    },
};

/// Which layer keyboard and wheel input currently edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    #[default]
    Photo,
    Overlay,
}

/// The uploaded base photo. Rotation is never applied to it.
#[derive(Clone, Debug, PartialEq)]
pub struct BasePhoto {
    pub image: ImageRef,
    pub transform: Transform,
}

/// The single editable overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub image: ImageRef,
    pub transform: Transform,
}

/// Snapshot of an overlay that was replaced by a newer one. Never mutated again.
#[derive(Clone, Debug, PartialEq)]
pub struct FrozenOverlay {
    image: ImageRef,
    transform: Transform,
}

impl FrozenOverlay {
    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn src(&self) -> &str {
        &self.image.source
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }
}

/// Color and texture adjustments applied to the base photo.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// 0..=200, 100 leaves colors untouched.
    pub saturation: f64,
    /// 0..=100, 0 disables the noise texture.
    pub noise: f64,
    /// Hue of the tint wash in degrees.
    pub tint_hue: f64,
    /// 0..=100, 0 disables the tint wash.
    pub tint_opacity: f64,
    /// Blur radius in CSS px, 0..=20.
    pub blur: f64,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            saturation: 100.0,
            noise: 0.0,
            tint_hue: 0.0,
            tint_opacity: 0.0,
            blur: 0.0,
        }
    }
}

fn clamp_or(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

impl Adjustments {
    /// Return a copy with every field clamped into its allowed range.
    pub fn clamped(self) -> Self {
        Self {
            saturation: clamp_or(self.saturation, 0.0, 200.0, 100.0),
            noise: clamp_or(self.noise, 0.0, 100.0, 0.0),
            tint_hue: if self.tint_hue.is_finite() {
                self.tint_hue.rem_euclid(360.0)
            } else {
                0.0
            },
            tint_opacity: clamp_or(self.tint_opacity, 0.0, 100.0, 0.0),
            blur: clamp_or(self.blur, 0.0, 20.0, 0.0),
        }
    }
}

/// Layer state for one workspace: base photo, active overlay and frozen overlays.
///
/// Frozen overlays are append-only; their order is paint order (first = bottom).
#[derive(Clone, Debug)]
pub struct LayerModel {
    cfg: EngineConfig,
    base: Option<BasePhoto>,
    active: Option<Overlay>,
    frozen: Vec<FrozenOverlay>,
    focus: Focus,
    adjustments: Adjustments,
}

impl LayerModel {
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            base: None,
            active: None,
            frozen: Vec::new(),
            focus: Focus::Photo,
            adjustments: Adjustments::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn base(&self) -> Option<&BasePhoto> {
        self.base.as_ref()
    }

    pub fn active_overlay(&self) -> Option<&Overlay> {
        self.active.as_ref()
    }

    pub fn frozen(&self) -> &[FrozenOverlay] {
        &self.frozen
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    /// Every image some layer currently draws.
    pub fn referenced_assets(&self) -> HashSet<AssetId> {
        self.base
            .iter()
            .map(|b| b.image.id)
            .chain(self.active.iter().map(|o| o.image.id))
            .chain(self.frozen.iter().map(|f| f.image().id))
            .collect()
    }

    /// Replace the base photo wholesale; its transform starts from identity.
    pub fn set_base_photo(&mut self, image: ImageRef) {
        self.base = Some(BasePhoto {
            image,
            transform: Transform::default(),
        });
    }

    /// Patch the base transform. Scale is clamped to the photo range and rotation is ignored.
    pub fn set_base_transform(&mut self, patch: TransformPatch) {
        let range = self.cfg.photo_scale;
        if let Some(base) = self.base.as_mut() {
            let patch = TransformPatch {
                rotation_deg: None,
                ..patch
            };
            patch.apply(&mut base.transform);
            base.transform.scale_percent = range.clamp(base.transform.scale_percent);
        }
    }

    pub(crate) fn nudge_base(&mut self, delta: Vec2) {
        if let Some(base) = self.base.as_mut() {
            base.transform.offset += delta;
        }
    }

    /// Make `image` the active overlay, freezing the previous one with its last transform.
    pub fn add_overlay(&mut self, image: ImageRef) {
        if let Some(prev) = self.active.take() {
            self.frozen.push(FrozenOverlay {
                image: prev.image,
                transform: prev.transform,
            });
        }
        self.active = Some(Overlay {
            image,
            transform: Transform::with_scale(self.cfg.default_overlay_scale),
        });
        self.focus = Focus::Overlay;
    }

    /// Drop the active overlay and hand focus back to the photo. No-op without one.
    pub fn remove_active_overlay(&mut self) {
        if self.active.take().is_some() {
            self.focus = Focus::Photo;
        }
    }

    /// Patch the active overlay transform as-is. Callers clamp scale for their input kind.
    pub fn update_active_overlay(&mut self, patch: TransformPatch) {
        if let Some(active) = self.active.as_mut() {
            patch.apply(&mut active.transform);
        }
    }

    /// Slider-style scale edit, clamped to the slider range.
    pub fn set_overlay_scale(&mut self, scale_percent: f64) {
        let s = self.cfg.overlay_slider_scale.clamp(scale_percent);
        self.update_active_overlay(TransformPatch::scale(s));
    }

    pub(crate) fn nudge_overlay(&mut self, delta: Vec2) {
        if let Some(active) = self.active.as_mut() {
            active.transform.offset += delta;
        }
    }

    /// Focus the overlay only when one exists.
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = match focus {
            Focus::Overlay if self.active.is_none() => Focus::Photo,
            f => f,
        };
    }

    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments.clamped();
    }

    pub fn update_adjustments(&mut self, f: impl FnOnce(&mut Adjustments)) {
        let mut next = self.adjustments;
        f(&mut next);
        self.adjustments = next.clamped();
    }

    /// Destroy every layer; adjustments return to defaults.
    pub fn reset(&mut self) {
        self.base = None;
        self.active = None;
        self.frozen.clear();
        self.focus = Focus::Photo;
        self.adjustments = Adjustments::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
