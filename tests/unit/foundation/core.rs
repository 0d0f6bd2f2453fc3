use super::*;

#[test]
fn transform_center_is_offset_from_viewport_middle() {
    let t = Transform {
        scale_percent: 60.0,
        offset: Vec2::new(15.0, -4.0),
        rotation_deg: 0.0,
    };
    let c = t.center(Size::new(400.0, 400.0));
    assert_eq!(c, Point::new(215.0, 196.0));
}

#[test]
fn display_rotation_wraps_but_storage_does_not() {
    let t = Transform {
        rotation_deg: -90.0,
        ..Transform::default()
    };
    assert_eq!(t.rotation_deg, -90.0);
    assert_eq!(t.display_rotation(), 270.0);

    let t = Transform {
        rotation_deg: 725.0,
        ..Transform::default()
    };
    assert!((t.display_rotation() - 5.0).abs() < 1e-9);
}

#[test]
fn patch_only_touches_set_fields() {
    let mut t = Transform {
        scale_percent: 80.0,
        offset: Vec2::new(1.0, 2.0),
        rotation_deg: 30.0,
    };
    TransformPatch::scale(120.0).apply(&mut t);
    assert_eq!(t.scale_percent, 120.0);
    assert_eq!(t.offset, Vec2::new(1.0, 2.0));
    assert_eq!(t.rotation_deg, 30.0);

    TransformPatch::default().apply(&mut t);
    assert_eq!(t.scale_percent, 120.0);
}

#[test]
fn scale_range_clamps_and_rejects_nan() {
    let r = ScaleRange::new(10.0, 300.0);
    assert_eq!(r.clamp(5.0), 10.0);
    assert_eq!(r.clamp(450.0), 300.0);
    assert_eq!(r.clamp(120.0), 120.0);
    assert_eq!(r.clamp(f64::NAN), 10.0);
}

#[test]
fn hue_primaries() {
    assert_eq!(Rgba8::from_hue(0.0), Rgba8::opaque(255, 0, 0));
    assert_eq!(Rgba8::from_hue(120.0), Rgba8::opaque(0, 255, 0));
    assert_eq!(Rgba8::from_hue(240.0), Rgba8::opaque(0, 0, 255));
    assert_eq!(Rgba8::from_hue(180.0), Rgba8::opaque(0, 255, 255));
    assert_eq!(Rgba8::from_hue(-120.0), Rgba8::from_hue(240.0));
}

#[test]
fn premultiplied_scales_channels_by_alpha() {
    assert_eq!(Rgba8::new(255, 128, 0, 255).premultiplied(), [255, 128, 0, 255]);
    assert_eq!(Rgba8::new(255, 255, 255, 0).premultiplied(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::new(200, 100, 50, 128).premultiplied(), [100, 50, 25, 128]);
}

#[test]
fn inverted_scale_range_still_clamps() {
    let r = ScaleRange::new(300.0, 100.0);
    assert_eq!(r.bounds(), (100.0, 300.0));
    assert_eq!(r.clamp(50.0), 100.0);
    assert_eq!(r.clamp(400.0), 300.0);
    assert!(r.contains(200.0));

    let nan = ScaleRange::new(f64::NAN, 200.0);
    assert_eq!(nan.clamp(250.0), 200.0);
}
