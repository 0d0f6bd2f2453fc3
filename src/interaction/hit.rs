//! Pointer-to-overlay geometry: local-space mapping and handle classification.

use crate::foundation::{
    config::EngineConfig,
    core::{Point, Size, Transform, Vec2},
    math::rotate,
};

/// Overlay corner, named in the overlay's unrotated local frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    Tl,
    Tr,
    Br,
    Bl,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Tl, Corner::Tr, Corner::Br, Corner::Bl];

    /// Unit signs of this corner in local space (y grows downward).
    pub fn signs(self) -> Vec2 {
        match self {
            Corner::Tl => Vec2::new(-1.0, -1.0),
            Corner::Tr => Vec2::new(1.0, -1.0),
            Corner::Br => Vec2::new(1.0, 1.0),
            Corner::Bl => Vec2::new(-1.0, 1.0),
        }
    }

    pub fn cursor(self) -> Cursor {
        match self {
            Corner::Tl | Corner::Br => Cursor::NwseResize,
            Corner::Tr | Corner::Bl => Cursor::NeswResize,
        }
    }
}

/// Pointer affordance reported to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    #[default]
    Default,
    Move,
    Grab,
    Grabbing,
    NwseResize,
    NeswResize,
}

/// Result of classifying a point against an overlay, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Corner(Corner),
    Rotate,
    Inside,
    Miss,
}

impl Hit {
    pub fn cursor(self) -> Cursor {
        match self {
            Hit::Corner(c) => c.cursor(),
            Hit::Rotate => Cursor::Grab,
            Hit::Inside => Cursor::Move,
            Hit::Miss => Cursor::Default,
        }
    }
}

/// Handle geometry used by the classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitConfig {
    pub handle_radius: f64,
    pub rotate_offset: f64,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            handle_radius: 14.0,
            rotate_offset: 24.0,
        }
    }
}

impl From<&EngineConfig> for HitConfig {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            handle_radius: cfg.handle_radius,
            rotate_offset: cfg.rotate_handle_offset,
        }
    }
}

/// Center and half-extents of an overlay's square box on a `view` surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayGeometry {
    pub center: Point,
    pub half: Vec2,
    pub rotation_rad: f64,
}

impl OverlayGeometry {
    pub fn new(view: Size, t: &Transform) -> Self {
        let k = t.scale_percent / 100.0 / 2.0;
        Self {
            center: t.center(view),
            half: Vec2::new(view.width * k, view.height * k),
            rotation_rad: t.rotation_rad(),
        }
    }

    /// Full box size in CSS pixels.
    pub fn size(&self) -> Size {
        Size::new(self.half.x * 2.0, self.half.y * 2.0)
    }

    /// Map a canvas point into the overlay's unrotated frame, origin at its center.
    pub fn to_local(&self, p: Point) -> Vec2 {
        rotate(p - self.center, -self.rotation_rad)
    }

    /// Map a local-frame vector back to canvas coordinates.
    pub fn to_canvas(&self, local: Vec2) -> Point {
        self.center + rotate(local, self.rotation_rad)
    }

    pub fn corner_local(&self, c: Corner) -> Vec2 {
        let s = c.signs();
        Vec2::new(s.x * self.half.x, s.y * self.half.y)
    }

    pub fn rotate_handle_local(&self, rotate_offset: f64) -> Vec2 {
        Vec2::new(0.0, -self.half.y - rotate_offset)
    }

    pub fn classify(&self, p: Point, cfg: &HitConfig) -> Hit {
        let local = self.to_local(p);
        let r = cfg.handle_radius;

        for c in Corner::ALL {
            if (local - self.corner_local(c)).hypot() <= r {
                return Hit::Corner(c);
            }
        }
        if (local - self.rotate_handle_local(cfg.rotate_offset)).hypot() <= r {
            return Hit::Rotate;
        }
        if local.x.abs() <= self.half.x && local.y.abs() <= self.half.y {
            return Hit::Inside;
        }
        Hit::Miss
    }
}

/// Classify canvas point `p` against an overlay placed with `t` on a `view` surface.
pub fn hit_test(p: Point, view: Size, t: &Transform, cfg: &HitConfig) -> Hit {
    OverlayGeometry::new(view, t).classify(p, cfg)
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/hit.rs"]
mod tests;
