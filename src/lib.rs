//! Layerforge is an interactive raster compositing engine.
//!
//! A square, DPR-correct canvas holds a cover-fitted base photo, any number of frozen
//! overlays and one active overlay that can be moved, scaled and rotated with pointer
//! gestures. The composition renders on the CPU and exports as numbered PNG artifacts.
//!
//! - Drive an [`Editor`] with pointer, keyboard and wheel input
//! - Draw previews with [`Editor::render_preview`]
//! - Export clean frames into an [`ArtifactSink`] with [`Editor::export`]
//! - Replay a [`SceneDocument`] and a [`GestureScript`] without a UI
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod export;
pub(crate) mod interaction;
pub(crate) mod layers;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod session;
pub(crate) mod viewport;

pub use crate::foundation::config::EngineConfig;
pub use crate::foundation::core::{
    Affine, BezPath, Point, Rect, Rgba8, ScaleRange, Size, Transform, TransformPatch, Vec2,
};
pub use crate::foundation::error::{ForgeError, ForgeResult};

pub use crate::assets::decode::{decode_image, sniff_raster};
pub use crate::assets::manifest::{
    DEFAULT_OVERLAY_FILES, OverlayCatalog, OverlaySource, asset_url,
};
pub use crate::assets::store::{AssetId, ImageRef, ImageStore, PreparedImage};
pub use crate::assets::upload::{UploadInput, ingest_upload};

pub use crate::export::ident::{ArtifactCounter, ArtifactId, COUNTER_KEY, ID_SPACE, RECENT_KEY};
pub use crate::export::pipeline::{
    ArtifactSink, DirSink, ExportedArtifact, MemorySink, artifact_file_name, encode_png,
    export_composition,
};
pub use crate::export::storage::{JsonFileStore, KvStore, MemoryStore};

pub use crate::interaction::hit::{Corner, Cursor, Hit, HitConfig, OverlayGeometry, hit_test};
pub use crate::interaction::machine::{
    DragMode, DragState, Interaction, Key, PointerEvent, PointerId, WHEEL_PERCENT_PER_UNIT,
    scale_from_radii,
};

pub use crate::layers::model::{
    Adjustments, BasePhoto, Focus, FrozenOverlay, LayerModel, Overlay,
};

pub use crate::render::compile::{
    DrawOp, Filter, Pass, RenderMode, RenderPlan, ScenePass, compile_scene, cover_scale,
    image_bounds, overlay_transform, photo_transform,
};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::{FrameRGBA, RenderBackend, RenderSettings};

pub use crate::scene::document::{ContainerSize, OverlayEntry, SceneDocument};
pub use crate::scene::script::{GestureScript, ScriptEvent};
pub use crate::session::editor::Editor;
pub use crate::viewport::sizer::{ResizeScheduler, Viewport};
