use super::*;

#[test]
fn fit_uses_smaller_side_and_clamps() {
    let cfg = EngineConfig::default();
    assert_eq!(Viewport::fit(900.0, 500.5, 1.0, &cfg).css_size, 500);
    assert_eq!(Viewport::fit(200.0, 900.0, 1.0, &cfg).css_size, 320);
    assert_eq!(Viewport::fit(1920.0, 1080.0, 1.0, &cfg).css_size, 720);
    assert_eq!(Viewport::fit(f64::NAN, 600.0, 1.0, &cfg).css_size, 320);
}

#[test]
fn dpr_is_clamped_to_one_and_two() {
    let cfg = EngineConfig::default();
    assert_eq!(Viewport::fit(400.0, 400.0, 0.5, &cfg).dpr, 1.0);
    assert_eq!(Viewport::fit(400.0, 400.0, 3.0, &cfg).dpr, 2.0);
    assert_eq!(Viewport::fit(400.0, 400.0, 1.5, &cfg).dpr, 1.5);
}

#[test]
fn buffer_is_css_times_dpr_and_base_transform_scales() {
    let vp = Viewport::new(400, 1.5).unwrap();
    assert_eq!(vp.buffer_px(), 600);
    let p = vp.base_transform() * kurbo::Point::new(400.0, 200.0);
    assert_eq!(p, kurbo::Point::new(600.0, 300.0));
    assert_eq!(vp.css(), Size::new(400.0, 400.0));
}

#[test]
fn new_rejects_degenerate_values() {
    assert!(Viewport::new(0, 1.0).is_err());
    assert!(Viewport::new(10, 0.0).is_err());
    assert!(Viewport::new(10, f64::INFINITY).is_err());
}

#[test]
fn scheduler_coalesces_to_latest_request() {
    let cfg = EngineConfig::default();
    let mut s = ResizeScheduler::default();
    assert!(s.take(1.0, &cfg).is_none());

    s.request(Size::new(400.0, 400.0));
    s.request(Size::new(500.0, 600.0));
    let vp = s.take(1.0, &cfg).unwrap();
    assert_eq!(vp.css_size, 500);
    assert!(s.take(1.0, &cfg).is_none());

    s.request_again();
    assert!(s.is_pending());
    assert_eq!(s.take(2.0, &cfg).unwrap(), Viewport::new(500, 2.0).unwrap());
}

#[test]
fn fit_tolerates_inverted_config_ranges() {
    let cfg = EngineConfig {
        min_css_size: 720.0,
        max_css_size: 320.0,
        min_dpr: 2.0,
        max_dpr: 1.0,
        ..EngineConfig::default()
    };
    let vp = Viewport::fit(500.0, 900.0, 3.0, &cfg);
    assert_eq!(vp.css_size, 500);
    assert_eq!(vp.dpr, 2.0);
}
