use crate::foundation::core::{Point, Vec2};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

pub(crate) fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

/// Deterministic per-pixel hash used for procedural noise.
pub(crate) fn hash_u32(seed: u64, x: u32, y: u32) -> u32 {
    let mut z = seed ^ (u64::from(x) << 32) ^ u64::from(y);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31)) as u32
}

/// Rotate `v` by `theta` radians (counter-clockwise in a y-down frame reads clockwise on screen).
pub(crate) fn rotate(v: Vec2, theta: f64) -> Vec2 {
    let (s, c) = theta.sin_cos();
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Rotate `p` around `center` by `theta` radians.
#[cfg(test)]
pub(crate) fn rotate_about(p: Point, center: Point, theta: f64) -> Point {
    center + rotate(p - center, theta)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
