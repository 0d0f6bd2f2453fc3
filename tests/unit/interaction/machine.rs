use std::sync::Arc;

use super::*;
use crate::{
    assets::store::{AssetId, ImageRef},
    foundation::config::EngineConfig,
};

const VIEW: Size = Size {
    width: 400.0,
    height: 400.0,
};

fn img(name: &str) -> ImageRef {
    ImageRef {
        id: AssetId::for_source(name),
        width: 32,
        height: 32,
        source: Arc::from(name),
    }
}

fn with_photo_and_overlay() -> LayerModel {
    let mut m = LayerModel::new(EngineConfig::default());
    m.set_base_photo(img("photo.png"));
    m.add_overlay(img("hat.png"));
    m
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn scale_ratio_matches_pointer_radii() {
    let range = ScaleRange::new(10.0, 300.0);
    let r0 = Vec2::new(-50.0, -50.0).hypot();
    let r1 = Vec2::new(-100.0, -100.0).hypot();
    assert!(approx(scale_from_radii(60.0, r0, r1, range), 120.0));
    assert_eq!(scale_from_radii(60.0, r0, r1 * 100.0, range), 300.0);
    assert_eq!(scale_from_radii(60.0, r0, 0.0, range), 10.0);
    assert_eq!(scale_from_radii(60.0, 0.0, r1, range), 60.0);
}

#[test]
fn corner_drag_scales_from_the_baseline() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    // Top-left corner of a 240px box centered at (200, 200).
    assert!(ix.pointer_down(&mut m, VIEW, 1, Point::new(80.0, 80.0)));
    assert!(matches!(
        ix.drag_mode(),
        Some(DragMode::ScaleOverlay {
            corner: Corner::Tl,
            ..
        })
    ));
    assert_eq!(ix.cursor(), Cursor::NwseResize);

    assert!(ix.pointer_move(&mut m, VIEW, 1, Point::new(-40.0, -40.0)));
    let s = m.active_overlay().unwrap().transform.scale_percent;
    assert!(approx(s, 120.0), "scale {s}");

    // Far outside clamps to the drag ceiling, back near the center clamps to the floor.
    ix.pointer_move(&mut m, VIEW, 1, Point::new(-4000.0, -4000.0));
    assert_eq!(m.active_overlay().unwrap().transform.scale_percent, 300.0);
    ix.pointer_move(&mut m, VIEW, 1, Point::new(199.0, 199.0));
    assert_eq!(m.active_overlay().unwrap().transform.scale_percent, 10.0);
}

#[test]
fn rotate_handle_drag_adds_angle_delta() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    assert!(ix.pointer_down(&mut m, VIEW, 7, Point::new(200.0, 56.0)));
    assert!(matches!(ix.drag_mode(), Some(DragMode::RotateOverlay { .. })));

    assert!(ix.pointer_move(&mut m, VIEW, 7, Point::new(344.0, 200.0)));
    let r = m.active_overlay().unwrap().transform.rotation_deg;
    assert!(approx(r, 90.0), "rotation {r}");
    ix.pointer_up(&mut m, VIEW, 7, Point::new(344.0, 200.0));
    assert!(!ix.is_dragging());
}

#[test]
fn miss_falls_through_to_photo_move() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    assert_eq!(m.focus(), Focus::Overlay);

    assert!(ix.pointer_down(&mut m, VIEW, 1, Point::new(10.0, 200.0)));
    assert_eq!(ix.drag_mode(), Some(DragMode::MovePhoto));
    assert_eq!(m.focus(), Focus::Photo);

    ix.pointer_move(&mut m, VIEW, 1, Point::new(15.0, 203.0));
    ix.pointer_move(&mut m, VIEW, 1, Point::new(17.0, 204.0));
    assert_eq!(m.base().unwrap().transform.offset, Vec2::ZERO);
    assert!(ix.on_frame(&mut m));
    assert_eq!(m.base().unwrap().transform.offset, Vec2::new(7.0, 4.0));
    assert_eq!(m.active_overlay().unwrap().transform.offset, Vec2::ZERO);
}

#[test]
fn moves_are_coalesced_per_frame() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    assert!(ix.pointer_down(&mut m, VIEW, 3, Point::new(200.0, 200.0)));
    assert_eq!(ix.drag_mode(), Some(DragMode::MoveOverlay));
    assert_eq!(ix.cursor(), Cursor::Grabbing);

    assert!(!ix.pointer_move(&mut m, VIEW, 3, Point::new(210.0, 205.0)));
    assert!(!ix.pointer_move(&mut m, VIEW, 3, Point::new(220.0, 215.0)));
    assert_eq!(m.active_overlay().unwrap().transform.offset, Vec2::ZERO);

    assert!(ix.on_frame(&mut m));
    assert_eq!(
        m.active_overlay().unwrap().transform.offset,
        Vec2::new(20.0, 15.0)
    );
    assert!(!ix.on_frame(&mut m));
}

#[test]
fn release_flushes_pending_moves() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    ix.pointer_down(&mut m, VIEW, 1, Point::new(200.0, 200.0));
    ix.pointer_move(&mut m, VIEW, 1, Point::new(210.0, 200.0));
    assert!(ix.pointer_up(&mut m, VIEW, 1, Point::new(210.0, 200.0)));
    assert!(!ix.is_dragging());
    assert_eq!(
        m.active_overlay().unwrap().transform.offset,
        Vec2::new(10.0, 0.0)
    );
    // Pointer now hovers the moved overlay's interior.
    assert_eq!(ix.cursor(), Cursor::Move);
}

#[test]
fn cancel_and_lost_capture_end_the_drag_like_release() {
    for lost in [false, true] {
        let mut m = with_photo_and_overlay();
        let mut ix = Interaction::default();
        ix.pointer_down(&mut m, VIEW, 9, Point::new(200.0, 200.0));
        ix.pointer_move(&mut m, VIEW, 9, Point::new(195.0, 190.0));
        let changed = if lost {
            ix.lost_capture(&mut m, VIEW, 9)
        } else {
            ix.pointer_cancel(&mut m, VIEW, 9)
        };
        assert!(changed);
        assert!(!ix.is_dragging());
        assert_eq!(
            m.active_overlay().unwrap().transform.offset,
            Vec2::new(-5.0, -10.0)
        );
        // Later moves no longer edit anything.
        ix.pointer_move(&mut m, VIEW, 9, Point::new(100.0, 100.0));
        assert!(!ix.on_frame(&mut m));
    }
}

#[test]
fn capture_is_owned_by_one_pointer() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    assert!(ix.pointer_down(&mut m, VIEW, 1, Point::new(200.0, 200.0)));
    assert!(!ix.pointer_down(&mut m, VIEW, 2, Point::new(10.0, 10.0)));
    assert_eq!(ix.captured_pointer(), Some(1));

    ix.pointer_move(&mut m, VIEW, 2, Point::new(300.0, 300.0));
    assert!(!ix.on_frame(&mut m));
    assert!(!ix.pointer_up(&mut m, VIEW, 2, Point::new(300.0, 300.0)));
    assert!(ix.is_dragging());
}

#[test]
fn nothing_to_drag_without_layers() {
    let mut m = LayerModel::new(EngineConfig::default());
    let mut ix = Interaction::default();
    assert!(!ix.pointer_down(&mut m, VIEW, 1, Point::new(200.0, 200.0)));
    assert!(!ix.is_dragging());
    assert_eq!(ix.hover_cursor(&m, VIEW, Point::new(200.0, 200.0)), Cursor::Default);
}

#[test]
fn escape_deselects_without_touching_the_overlay() {
    let mut m = with_photo_and_overlay();
    let before = m.active_overlay().unwrap().transform;
    let mut ix = Interaction::default();
    assert!(ix.key(&mut m, Key::Escape));
    assert_eq!(m.focus(), Focus::Photo);
    assert_eq!(m.active_overlay().unwrap().transform, before);
    assert!(!ix.key(&mut m, Key::Escape));
}

#[test]
fn delete_removes_only_a_focused_overlay() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    m.set_focus(Focus::Photo);
    assert!(!ix.key(&mut m, Key::Delete));
    assert!(m.active_overlay().is_some());

    m.set_focus(Focus::Overlay);
    assert!(ix.key(&mut m, Key::Backspace));
    assert!(m.active_overlay().is_none());
    assert_eq!(m.focus(), Focus::Photo);
    assert!(!ix.key(&mut m, Key::Delete));
    assert!(!ix.key(&mut m, Key::Other));
}

#[test]
fn delete_mid_drag_drops_the_gesture() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    ix.pointer_down(&mut m, VIEW, 1, Point::new(200.0, 200.0));
    ix.pointer_move(&mut m, VIEW, 1, Point::new(250.0, 200.0));
    assert!(ix.key(&mut m, Key::Delete));
    assert!(!ix.is_dragging());
    assert!(!ix.on_frame(&mut m));
}

#[test]
fn wheel_zooms_the_focused_layer() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();

    assert!(ix.wheel(&mut m, -200.0));
    assert!(approx(m.active_overlay().unwrap().transform.scale_percent, 70.0));

    m.set_focus(Focus::Photo);
    assert!(ix.wheel(&mut m, -100.0));
    assert!(approx(m.base().unwrap().transform.scale_percent, 105.0));
    assert!(ix.wheel(&mut m, 1000.0));
    assert_eq!(m.base().unwrap().transform.scale_percent, 100.0);
    assert!(!ix.wheel(&mut m, f64::NAN));
}

#[test]
fn hover_reports_handle_cursors() {
    let m = with_photo_and_overlay();
    let ix = Interaction::default();
    assert_eq!(ix.hover_cursor(&m, VIEW, Point::new(320.0, 80.0)), Cursor::NeswResize);
    assert_eq!(ix.hover_cursor(&m, VIEW, Point::new(200.0, 56.0)), Cursor::Grab);
    assert_eq!(ix.hover_cursor(&m, VIEW, Point::new(200.0, 200.0)), Cursor::Move);
    assert_eq!(ix.hover_cursor(&m, VIEW, Point::new(5.0, 5.0)), Cursor::Grab);
}

#[test]
fn pointer_events_dispatch_to_the_state_machine() {
    let mut m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    let events = [
        PointerEvent::Down {
            pointer: 4,
            x: 200.0,
            y: 200.0,
        },
        PointerEvent::Move {
            pointer: 4,
            x: 230.0,
            y: 190.0,
        },
        PointerEvent::LostCapture { pointer: 4 },
    ];
    for ev in events {
        ix.handle(&mut m, VIEW, ev);
    }
    assert!(!ix.is_dragging());
    assert_eq!(
        m.active_overlay().unwrap().transform.offset,
        Vec2::new(30.0, -10.0)
    );

    let json = r#"{"type":"down","pointer":1,"x":3.5,"y":4.0}"#;
    let ev: PointerEvent = serde_json::from_str(json).unwrap();
    assert_eq!(
        ev,
        PointerEvent::Down {
            pointer: 1,
            x: 3.5,
            y: 4.0
        }
    );
}

#[test]
fn hover_updates_the_reported_cursor() {
    let m = with_photo_and_overlay();
    let mut ix = Interaction::default();
    assert_eq!(ix.hover(&m, VIEW, Point::new(80.0, 80.0)), Cursor::NwseResize);
    assert_eq!(ix.cursor(), Cursor::NwseResize);
}
