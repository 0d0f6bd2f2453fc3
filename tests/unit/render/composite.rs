use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn half_transparent_white_over_black_is_mid_gray() {
    let out = over([0, 0, 0, 255], [128, 128, 128, 128], 1.0);
    assert_eq!(out[3], 255);
    assert!((i32::from(out[0]) - 128).abs() <= 1);
}

#[test]
fn layer_composite_rejects_mismatched_buffers() {
    let mut canvas = vec![0u8; 8];
    assert!(composite_layer(&mut canvas, &[0u8; 4]).is_err());
    assert!(composite_layer(&mut canvas, &[9u8; 8]).is_ok());
}

#[test]
fn layer_composite_keeps_canvas_under_transparent_pixels() {
    let mut canvas = vec![10, 20, 30, 255, 10, 20, 30, 255];
    let layer = [0, 0, 0, 0, 0, 128, 0, 128];
    composite_layer(&mut canvas, &layer).unwrap();
    assert_eq!(&canvas[..4], &[10, 20, 30, 255]);
    assert_eq!(canvas[7], 255);
    assert!((i32::from(canvas[5]) - 138).abs() <= 1);
}

#[test]
fn nan_opacity_is_treated_as_zero() {
    assert_eq!(over([1, 2, 3, 4], [200, 200, 200, 255], f32::NAN), [1, 2, 3, 4]);
}
