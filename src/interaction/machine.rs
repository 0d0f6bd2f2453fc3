//! Pointer-driven drag state machine.
//!
//! The interaction target is always re-derived from geometry at pointer-down; the layer
//! focus flag is written as an output and never consulted to pick the target.

use crate::{
    foundation::core::{Point, ScaleRange, Size, TransformPatch, Vec2},
    interaction::hit::{Corner, Cursor, Hit, HitConfig, OverlayGeometry},
    layers::model::{Focus, LayerModel},
};

pub type PointerId = u64;

/// Wheel zoom speed in scale-percent points per wheel delta unit.
pub const WHEEL_PERCENT_PER_UNIT: f64 = 0.05;

const MIN_BASELINE_RADIUS: f64 = 1e-6;

/// What a drag edits, with the baseline each mode needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragMode {
    MovePhoto,
    MoveOverlay,
    ScaleOverlay {
        corner: Corner,
        baseline_radius: f64,
        baseline_scale: f64,
    },
    RotateOverlay {
        baseline_angle: f64,
        baseline_rotation: f64,
    },
}

impl DragMode {
    fn cursor(self) -> Cursor {
        match self {
            DragMode::MovePhoto | DragMode::MoveOverlay | DragMode::RotateOverlay { .. } => {
                Cursor::Grabbing
            }
            DragMode::ScaleOverlay { corner, .. } => corner.cursor(),
        }
    }

    fn is_overlay(self) -> bool {
        !matches!(self, DragMode::MovePhoto)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer: PointerId,
        mode: DragMode,
        last: Point,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    #[serde(other)]
    Other,
}

/// Pointer input in canvas-local CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { pointer: PointerId, x: f64, y: f64 },
    Move { pointer: PointerId, x: f64, y: f64 },
    Up { pointer: PointerId, x: f64, y: f64 },
    Cancel { pointer: PointerId },
    LostCapture { pointer: PointerId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoveTarget {
    Photo,
    Overlay,
}

/// Move deltas accumulated between frame ticks.
#[derive(Clone, Copy, Debug, Default)]
struct DragAccumulator {
    pending: Option<(MoveTarget, Vec2)>,
}

impl DragAccumulator {
    fn add(&mut self, target: MoveTarget, d: Vec2) {
        self.pending = match self.pending {
            Some((t, acc)) if t == target => Some((t, acc + d)),
            _ => Some((target, d)),
        };
    }

    fn flush(&mut self, layers: &mut LayerModel) -> bool {
        let Some((target, d)) = self.pending.take() else {
            return false;
        };
        if d == Vec2::ZERO {
            return false;
        }
        match target {
            MoveTarget::Photo => layers.nudge_base(d),
            MoveTarget::Overlay => layers.nudge_overlay(d),
        }
        true
    }

    fn clear(&mut self) {
        self.pending = None;
    }
}

/// `baseline_scale` grown by the ratio of pointer radii, clamped to `range`.
pub fn scale_from_radii(
    baseline_scale: f64,
    baseline_radius: f64,
    radius: f64,
    range: ScaleRange,
) -> f64 {
    if baseline_radius < MIN_BASELINE_RADIUS {
        return range.clamp(baseline_scale);
    }
    range.clamp(baseline_scale * (radius / baseline_radius))
}

fn angle_around(center: Point, p: Point) -> f64 {
    let v = p - center;
    v.y.atan2(v.x)
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
    hit: HitConfig,
    state: DragState,
    acc: DragAccumulator,
    cursor: Cursor,
}

impl Interaction {
    pub fn new(hit: HitConfig) -> Self {
        Self {
            hit,
            ..Self::default()
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { mode, .. } => Some(mode),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pointer that currently owns the gesture.
    pub fn captured_pointer(&self) -> Option<PointerId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { pointer, .. } => Some(pointer),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn select_mode(&self, layers: &LayerModel, view: Size, p: Point) -> Option<DragMode> {
        if let Some(ov) = layers.active_overlay() {
            let g = OverlayGeometry::new(view, &ov.transform);
            match g.classify(p, &self.hit) {
                Hit::Corner(corner) => {
                    return Some(DragMode::ScaleOverlay {
                        corner,
                        baseline_radius: (p - g.center).hypot(),
                        baseline_scale: ov.transform.scale_percent,
                    });
                }
                Hit::Rotate => {
                    return Some(DragMode::RotateOverlay {
                        baseline_angle: angle_around(g.center, p),
                        baseline_rotation: ov.transform.rotation_deg,
                    });
                }
                Hit::Inside => return Some(DragMode::MoveOverlay),
                Hit::Miss => {}
            }
        }
        layers.base().map(|_| DragMode::MovePhoto)
    }

    /// Start a gesture. Returns `true` when `pointer` now owns the drag.
    ///
    /// A pointer-down while another gesture is in flight is ignored.
    pub fn pointer_down(
        &mut self,
        layers: &mut LayerModel,
        view: Size,
        pointer: PointerId,
        p: Point,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(mode) = self.select_mode(layers, view, p) else {
            return false;
        };
        layers.set_focus(if mode.is_overlay() {
            Focus::Overlay
        } else {
            Focus::Photo
        });
        self.acc.clear();
        self.state = DragState::Dragging {
            pointer,
            mode,
            last: p,
        };
        self.cursor = mode.cursor();
        tracing::trace!(pointer, ?mode, "drag started");
        true
    }

    /// Feed a pointer position. Returns `true` when the model changed immediately
    /// (scale and rotate); moves are deferred to [`Self::on_frame`].
    pub fn pointer_move(
        &mut self,
        layers: &mut LayerModel,
        view: Size,
        pointer: PointerId,
        p: Point,
    ) -> bool {
        let DragState::Dragging {
            pointer: owner,
            mode,
            last,
        } = self.state
        else {
            self.cursor = self.hover_cursor(layers, view, p);
            return false;
        };
        if owner != pointer {
            return false;
        }
        self.state = DragState::Dragging {
            pointer: owner,
            mode,
            last: p,
        };

        match mode {
            DragMode::MovePhoto => {
                self.acc.add(MoveTarget::Photo, p - last);
                false
            }
            DragMode::MoveOverlay => {
                self.acc.add(MoveTarget::Overlay, p - last);
                false
            }
            DragMode::ScaleOverlay {
                baseline_radius,
                baseline_scale,
                ..
            } => {
                let Some(ov) = layers.active_overlay() else {
                    return false;
                };
                let center = ov.transform.center(view);
                let s = scale_from_radii(
                    baseline_scale,
                    baseline_radius,
                    (p - center).hypot(),
                    layers.config().overlay_drag_scale,
                );
                layers.update_active_overlay(TransformPatch::scale(s));
                true
            }
            DragMode::RotateOverlay {
                baseline_angle,
                baseline_rotation,
            } => {
                let Some(ov) = layers.active_overlay() else {
                    return false;
                };
                let angle = angle_around(ov.transform.center(view), p);
                let r = baseline_rotation + (angle - baseline_angle).to_degrees();
                layers.update_active_overlay(TransformPatch::rotation(r));
                true
            }
        }
    }

    /// Animation-frame tick: commit accumulated move deltas. Returns `true` if anything moved.
    pub fn on_frame(&mut self, layers: &mut LayerModel) -> bool {
        self.acc.flush(layers)
    }

    /// End the gesture owned by `pointer`. Pending moves are committed, never rolled back.
    pub fn pointer_up(
        &mut self,
        layers: &mut LayerModel,
        view: Size,
        pointer: PointerId,
        p: Point,
    ) -> bool {
        if self.captured_pointer() != Some(pointer) {
            return false;
        }
        let changed = self.acc.flush(layers);
        self.state = DragState::Idle;
        self.cursor = self.hover_cursor(layers, view, p);
        changed
    }

    /// Cancellation behaves exactly like release at the last known position.
    pub fn pointer_cancel(&mut self, layers: &mut LayerModel, view: Size, pointer: PointerId) -> bool {
        let DragState::Dragging { last, .. } = self.state else {
            return false;
        };
        self.pointer_up(layers, view, pointer, last)
    }

    /// Losing pointer capture (e.g. pointer left the window) ends the gesture like a release.
    pub fn lost_capture(&mut self, layers: &mut LayerModel, view: Size, pointer: PointerId) -> bool {
        self.pointer_cancel(layers, view, pointer)
    }

    /// Dispatch a [`PointerEvent`]. Returns `true` when the model changed immediately.
    pub fn handle(&mut self, layers: &mut LayerModel, view: Size, ev: PointerEvent) -> bool {
        match ev {
            PointerEvent::Down { pointer, x, y } => {
                self.pointer_down(layers, view, pointer, Point::new(x, y))
            }
            PointerEvent::Move { pointer, x, y } => {
                self.pointer_move(layers, view, pointer, Point::new(x, y))
            }
            PointerEvent::Up { pointer, x, y } => {
                self.pointer_up(layers, view, pointer, Point::new(x, y))
            }
            PointerEvent::Cancel { pointer } => self.pointer_cancel(layers, view, pointer),
            PointerEvent::LostCapture { pointer } => self.lost_capture(layers, view, pointer),
        }
    }

    /// Returns `true` when the key changed the model.
    pub fn key(&mut self, layers: &mut LayerModel, key: Key) -> bool {
        match key {
            Key::Escape => {
                let changed = layers.focus() != Focus::Photo;
                layers.set_focus(Focus::Photo);
                changed
            }
            Key::Delete | Key::Backspace => {
                if layers.focus() != Focus::Overlay || layers.active_overlay().is_none() {
                    return false;
                }
                self.forget_overlay();
                layers.remove_active_overlay();
                true
            }
            Key::Other => false,
        }
    }

    /// Scale the focused layer by wheel input.
    pub fn wheel(&mut self, layers: &mut LayerModel, delta_y: f64) -> bool {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return false;
        }
        let step = -delta_y * WHEEL_PERCENT_PER_UNIT;
        match layers.focus() {
            Focus::Overlay => {
                let Some(ov) = layers.active_overlay() else {
                    return false;
                };
                let s = layers
                    .config()
                    .overlay_drag_scale
                    .clamp(ov.transform.scale_percent + step);
                layers.update_active_overlay(TransformPatch::scale(s));
                true
            }
            Focus::Photo => {
                let Some(base) = layers.base() else {
                    return false;
                };
                let s = base.transform.scale_percent + step;
                layers.set_base_transform(TransformPatch::scale(s));
                true
            }
        }
    }

    /// Drop any gesture or pending move that targets the active overlay.
    pub fn forget_overlay(&mut self) {
        if let DragState::Dragging { mode, .. } = self.state
            && mode.is_overlay()
        {
            self.state = DragState::Idle;
            self.cursor = Cursor::Default;
        }
        if matches!(self.acc.pending, Some((MoveTarget::Overlay, _))) {
            self.acc.clear();
        }
    }

    /// Forget everything, e.g. after a workspace reset.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.acc.clear();
        self.cursor = Cursor::Default;
    }

    /// Refresh the cursor for a pointer hovering at `p`.
    pub fn hover(&mut self, layers: &LayerModel, view: Size, p: Point) -> Cursor {
        self.cursor = self.hover_cursor(layers, view, p);
        self.cursor
    }

    /// Cursor for `p`; while dragging, the drag's own cursor.
    pub fn hover_cursor(&self, layers: &LayerModel, view: Size, p: Point) -> Cursor {
        if let DragState::Dragging { mode, .. } = self.state {
            return mode.cursor();
        }
        if let Some(ov) = layers.active_overlay() {
            let hit = OverlayGeometry::new(view, &ov.transform).classify(p, &self.hit);
            if hit != Hit::Miss {
                return hit.cursor();
            }
        }
        if layers.base().is_some() {
            Cursor::Grab
        } else {
            Cursor::Default
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/machine.rs"]
mod tests;
