//! Source-over compositing of premultiplied RGBA8.

use crate::foundation::{
    error::{ForgeError, ForgeResult},
    math::{add_sat_u8, mul_div255},
};

pub type PremulRgba8 = [u8; 4];

/// `src` faded by `opacity`, then laid over `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let k = opacity_u8(opacity);
    if k == 0 {
        return dst;
    }
    let faded = src.map(|c| mul_div255(u16::from(c), k) as u8);
    blend(dst, faded)
}

fn opacity_u8(opacity: f32) -> u16 {
    if opacity.is_nan() {
        return 0;
    }
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u16
}

/// `src + dst * (1 - src.a)` on every channel, alpha included.
fn blend(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        a => {
            let keep = 255 - u16::from(a);
            std::array::from_fn(|i| {
                add_sat_u8(u16::from(src[i]), mul_div255(u16::from(dst[i]), keep))
            })
        }
    }
}

/// Lay a freshly rasterized scene layer over the canvas, both `width*height*4` bytes.
pub fn composite_layer(canvas: &mut [u8], layer: &[u8]) -> ForgeResult<()> {
    if canvas.len() != layer.len() || !canvas.len().is_multiple_of(4) {
        return Err(ForgeError::render(
            "scene layer does not match the canvas size",
        ));
    }
    for (d, s) in canvas.chunks_exact_mut(4).zip(layer.chunks_exact(4)) {
        let out = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
