//! Recorded input sequences replayed against an [`Editor`].

use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::{core::Point, error::ForgeResult},
    interaction::machine::{Key, PointerEvent, PointerId},
    session::editor::Editor,
};

/// One step of a gesture script.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Down { pointer: PointerId, x: f64, y: f64 },
    Move { pointer: PointerId, x: f64, y: f64 },
    Up { pointer: PointerId, x: f64, y: f64 },
    Cancel { pointer: PointerId },
    LostCapture { pointer: PointerId },
    /// Frame tick: pending resizes and coalesced moves are applied.
    Frame,
    Key { key: Key },
    Wheel { delta_y: f64 },
    Hover { x: f64, y: f64 },
    RemoveOverlay,
    OverlayScale { scale_percent: f64 },
}

impl ScriptEvent {
    fn pointer_event(self) -> Option<PointerEvent> {
        Some(match self {
            Self::Down { pointer, x, y } => PointerEvent::Down { pointer, x, y },
            Self::Move { pointer, x, y } => PointerEvent::Move { pointer, x, y },
            Self::Up { pointer, x, y } => PointerEvent::Up { pointer, x, y },
            Self::Cancel { pointer } => PointerEvent::Cancel { pointer },
            Self::LostCapture { pointer } => PointerEvent::LostCapture { pointer },
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GestureScript {
    pub events: Vec<ScriptEvent>,
}

impl GestureScript {
    pub fn from_json(text: &str) -> ForgeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[tracing::instrument]
    pub fn from_path(path: &Path) -> ForgeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read gesture script '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Feed every event to `editor`, then tick one final frame.
    ///
    /// Returns the number of frames that reported a redraw.
    #[tracing::instrument(skip_all, fields(events = self.events.len()))]
    pub fn play(&self, editor: &mut Editor) -> usize {
        let mut redraws = 0;
        for &ev in &self.events {
            if let Some(p) = ev.pointer_event() {
                editor.pointer(p);
                continue;
            }
            match ev {
                ScriptEvent::Frame => redraws += usize::from(editor.on_frame()),
                ScriptEvent::Key { key } => editor.key(key),
                ScriptEvent::Wheel { delta_y } => editor.wheel(delta_y),
                ScriptEvent::Hover { x, y } => {
                    editor.hover(Point::new(x, y));
                }
                ScriptEvent::RemoveOverlay => editor.remove_active_overlay(),
                ScriptEvent::OverlayScale { scale_percent } => {
                    editor.set_overlay_scale(scale_percent)
                }
                _ => {}
            }
        }
        redraws += usize::from(editor.on_frame());
        tracing::debug!(redraws, "script played");
        redraws
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/script.rs"]
mod tests;
