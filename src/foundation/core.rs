pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Fully saturated color at 50% lightness for `hue_deg` (any value, wrapped to [0, 360)).
    pub fn from_hue(hue_deg: f64) -> Self {
        let h = hue_deg.rem_euclid(360.0) / 60.0;
        let x = 1.0 - ((h % 2.0) - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to_u8 = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::opaque(to_u8(r), to_u8(g), to_u8(b))
    }

    pub fn premultiplied(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

/// Placement of a layer relative to the viewport center.
///
/// `offset` is in CSS pixels. `rotation_deg` is unbounded; use
/// [`Transform::display_rotation`] for a value normalized to [0, 360).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub scale_percent: f64,
    #[serde(default = "zero_vec")]
    pub offset: Vec2,
    #[serde(default)]
    pub rotation_deg: f64,
}

fn zero_vec() -> Vec2 {
    Vec2::ZERO
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_percent: 100.0,
            offset: Vec2::ZERO,
            rotation_deg: 0.0,
        }
    }
}

impl Transform {
    pub fn with_scale(scale_percent: f64) -> Self {
        Self {
            scale_percent,
            ..Self::default()
        }
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.to_radians()
    }

    pub fn display_rotation(&self) -> f64 {
        self.rotation_deg.rem_euclid(360.0)
    }

    /// Center of the layer in viewport-local CSS pixels.
    pub fn center(&self, view: Size) -> Point {
        Point::new(view.width / 2.0, view.height / 2.0) + self.offset
    }
}

/// Partial update applied to a [`Transform`]; `None` fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformPatch {
    #[serde(default)]
    pub scale_percent: Option<f64>,
    #[serde(default)]
    pub offset: Option<Vec2>,
    #[serde(default)]
    pub rotation_deg: Option<f64>,
}

impl TransformPatch {
    pub fn scale(scale_percent: f64) -> Self {
        Self {
            scale_percent: Some(scale_percent),
            ..Self::default()
        }
    }

    pub fn offset(offset: Vec2) -> Self {
        Self {
            offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn rotation(rotation_deg: f64) -> Self {
        Self {
            rotation_deg: Some(rotation_deg),
            ..Self::default()
        }
    }

    pub fn apply(self, t: &mut Transform) {
        if let Some(s) = self.scale_percent {
            t.scale_percent = s;
        }
        if let Some(o) = self.offset {
            t.offset = o;
        }
        if let Some(r) = self.rotation_deg {
            t.rotation_deg = r;
        }
    }
}

/// Inclusive clamp range for a scale percentage.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `(low, high)` regardless of the order `min` and `max` were given in.
    pub fn bounds(self) -> (f64, f64) {
        (self.min.min(self.max), self.min.max(self.max))
    }

    /// Clamp `v` into the range. Non-finite input maps to the lower bound.
    pub fn clamp(self, v: f64) -> f64 {
        let (lo, hi) = self.bounds();
        if !v.is_finite() {
            return lo;
        }
        clamp_lenient(v, lo, hi)
    }

    pub fn contains(self, v: f64) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&v)
    }
}

/// `v` limited to `[lo, hi]` without `f64::clamp`'s panics on unordered or NaN bounds.
fn clamp_lenient(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
