//! Square, device-pixel-ratio-correct render surface sizing.

use crate::foundation::{
    config::EngineConfig,
    core::{Affine, ScaleRange, Size},
    error::{ForgeError, ForgeResult},
};

/// The visible square render surface.
///
/// All geometry is expressed in CSS pixels; the pixel buffer is `css_size * dpr`
/// on each side and [`Viewport::base_transform`] maps CSS pixels onto it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub css_size: u32,
    pub dpr: f64,
}

impl Viewport {
    /// Fit a square surface into a `container_w x container_h` layout box.
    pub fn fit(container_w: f64, container_h: f64, dpr: f64, cfg: &EngineConfig) -> Self {
        let avail = container_w.min(container_h);
        let avail = if avail.is_finite() { avail } else { 0.0 };
        let css_range = ScaleRange::new(cfg.min_css_size, cfg.max_css_size);
        let dpr_range = ScaleRange::new(cfg.min_dpr, cfg.max_dpr);
        let css = css_range.clamp(avail).floor();
        let dpr = if dpr.is_finite() { dpr } else { 1.0 };
        Self {
            css_size: css.max(0.0) as u32,
            dpr: dpr_range.clamp(dpr),
        }
    }

    pub fn new(css_size: u32, dpr: f64) -> ForgeResult<Self> {
        if css_size == 0 {
            return Err(ForgeError::validation("viewport css_size must be > 0"));
        }
        if !(dpr.is_finite() && dpr > 0.0) {
            return Err(ForgeError::validation("viewport dpr must be > 0"));
        }
        Ok(Self { css_size, dpr })
    }

    pub fn css(&self) -> Size {
        let s = f64::from(self.css_size);
        Size::new(s, s)
    }

    /// Side length of the backing pixel buffer.
    pub fn buffer_px(&self) -> u32 {
        (f64::from(self.css_size) * self.dpr).round() as u32
    }

    /// CSS-pixel to buffer-pixel mapping applied before any drawing.
    pub fn base_transform(&self) -> Affine {
        Affine::scale(self.dpr)
    }
}

/// Coalesces resize requests so the viewport is recomputed at most once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResizeScheduler {
    pending: Option<Size>,
    last: Option<Size>,
}

impl ResizeScheduler {
    /// Record the latest container size; only the newest request survives until [`Self::take`].
    pub fn request(&mut self, container: Size) {
        self.pending = Some(container);
    }

    /// Re-run the last known layout, e.g. after the base image finished loading.
    pub fn request_again(&mut self) {
        if self.pending.is_none()
            && let Some(size) = self.last
        {
            self.pending = Some(size);
        }
    }

    /// Consume the pending request at a frame boundary.
    pub fn take(&mut self, dpr: f64, cfg: &EngineConfig) -> Option<Viewport> {
        let size = self.pending.take()?;
        self.last = Some(size);
        Some(Viewport::fit(size.width, size.height, dpr, cfg))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/sizer.rs"]
mod tests;
