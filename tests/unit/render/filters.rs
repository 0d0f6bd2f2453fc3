use super::*;

#[test]
fn saturate_one_is_identity() {
    let mut px = vec![200u8, 40, 90, 255, 10, 20, 30, 128];
    let before = px.clone();
    saturate_in_place(&mut px, 1.0);
    assert_eq!(px, before);
}

#[test]
fn saturate_zero_makes_gray() {
    let mut px = vec![255u8, 0, 0, 255];
    saturate_in_place(&mut px, 0.0);
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert_eq!(px[3], 255);
    assert!((i32::from(px[0]) - 54).abs() <= 1);
}

#[test]
fn oversaturation_stays_within_alpha() {
    let mut px = vec![100u8, 60, 20, 128];
    saturate_in_place(&mut px, 2.0);
    assert!(px[..3].iter().all(|&c| c <= 128));
    assert!(px[0] > 100);
}

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap(), src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();
    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn blur_rejects_bad_input() {
    assert!(blur_rgba8_premul(&[0u8; 3], 1, 1, 1, 1.0).is_err());
    assert!(blur_rgba8_premul(&[0u8; 4], 1, 1, 1, 0.0).is_err());
}

#[test]
fn noise_tile_is_deterministic_and_varied() {
    let a = noise_tile(16, 7);
    assert_eq!(a, noise_tile(16, 7));
    assert_ne!(a, noise_tile(16, 8));
    assert_eq!(a.len(), 256);
    let min = a.iter().min().copied().unwrap();
    let max = a.iter().max().copied().unwrap();
    assert!(max - min > 64);
}

#[test]
fn noise_repeats_across_tiles() {
    let tile = noise_tile(4, 1);
    let (w, h) = (8u32, 8u32);
    let mut canvas = [0u8, 0, 0, 255].repeat((w * h) as usize);
    apply_noise_in_place(&mut canvas, w, h, &tile, 4, 0.5).unwrap();
    let at = |x: usize, y: usize| canvas[(y * 8 + x) * 4];
    assert_eq!(at(1, 2), at(5, 6));
    assert_eq!(at(0, 0), at(4, 4));
}

#[test]
fn zero_alpha_noise_is_noop() {
    let tile = noise_tile(4, 1);
    let mut canvas = [9u8, 8, 7, 255].repeat(4);
    let before = canvas.clone();
    apply_noise_in_place(&mut canvas, 2, 2, &tile, 4, 0.0).unwrap();
    assert_eq!(canvas, before);
}
