//! In-place effects on premultiplied RGBA8 canvases.

use crate::{
    foundation::{
        error::{ForgeError, ForgeResult},
        math::hash_u32,
    },
    render::composite::over,
};

fn expect_len(len: usize, width: u32, height: u32) -> ForgeResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ForgeError::render("filter buffer size overflow"))?;
    if len != expected {
        return Err(ForgeError::render(
            "filter expects a buffer matching width*height*4",
        ));
    }
    Ok(())
}

/// CSS `saturate(amount)` color matrix applied to premultiplied pixels.
///
/// The matrix is linear, so it is valid on premultiplied channels; results are clamped to alpha.
pub fn saturate_in_place(rgba: &mut [u8], amount: f32) {
    if (amount - 1.0).abs() <= f32::EPSILON {
        return;
    }
    let s = amount.max(0.0);
    let m = [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ];
    for px in rgba.chunks_exact_mut(4) {
        let a = f32::from(px[3]);
        if a == 0.0 {
            continue;
        }
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        for (c, row) in m.iter().enumerate() {
            let v = row[0] * r + row[1] * g + row[2] * b;
            px[c] = v.round().clamp(0.0, a) as u8;
        }
    }
}

pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> ForgeResult<Vec<u8>> {
    expect_len(src.len(), width, height)?;
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ForgeResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ForgeError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(ForgeError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|&wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out_idx + c] = q16_to_u8(*a);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out_idx + c] = q16_to_u8(*a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Square grayscale noise tile, one byte per pixel. Same seed, same tile.
pub fn noise_tile(tile_px: u32, seed: u64) -> Vec<u8> {
    let n = tile_px as usize;
    let mut out = Vec::with_capacity(n * n);
    for y in 0..tile_px {
        for x in 0..tile_px {
            out.push((hash_u32(seed, x, y) >> 24) as u8);
        }
    }
    out
}

/// Composite `tile` repeated across the canvas at `alpha`.
pub fn apply_noise_in_place(
    rgba: &mut [u8],
    width: u32,
    height: u32,
    tile: &[u8],
    tile_px: u32,
    alpha: f32,
) -> ForgeResult<()> {
    expect_len(rgba.len(), width, height)?;
    if tile_px == 0 || tile.len() != (tile_px as usize) * (tile_px as usize) {
        return Err(ForgeError::render("noise tile does not match its size"));
    }
    if alpha <= 0.0 {
        return Ok(());
    }
    let t = tile_px as usize;
    for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
        let x = i % width as usize;
        let y = i / width as usize;
        let v = tile[(y % t) * t + (x % t)];
        let out = over([px[0], px[1], px[2], px[3]], [v, v, v, 255], alpha);
        px.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/filters.rs"]
mod tests;
