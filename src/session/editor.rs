//! Host-facing façade tying layers, input, rendering and export together.
//!
//! Every operation here follows the same failure rule: problems are logged and the
//! operation degrades to a no-op (`None` / `false`); nothing propagates to the host.

use std::collections::HashSet;

use crate::{
    assets::{
        manifest::OverlaySource,
        store::{AssetId, ImageRef, ImageStore},
        upload::{UploadInput, ingest_upload},
    },
    export::{
        ident::ArtifactCounter,
        pipeline::{ArtifactSink, ExportedArtifact, export_composition},
        storage::{KvStore, MemoryStore},
    },
    foundation::{
        config::EngineConfig,
        core::{Point, Size, TransformPatch},
        error::ForgeResult,
    },
    interaction::{
        hit::{Cursor, HitConfig},
        machine::{Interaction, Key, PointerEvent},
    },
    layers::model::{Adjustments, Focus, LayerModel},
    render::{
        FrameRGBA, RenderBackend, RenderSettings,
        compile::{RenderMode, compile_scene},
        cpu::CpuBackend,
    },
    viewport::sizer::{ResizeScheduler, Viewport},
};

pub struct Editor {
    layers: LayerModel,
    images: ImageStore,
    interaction: Interaction,
    viewport: Option<Viewport>,
    resize: ResizeScheduler,
    dpr: f64,
    backend: CpuBackend,
    counter: ArtifactCounter,
    store: Box<dyn KvStore>,
    dirty: bool,
}

impl Editor {
    /// Editor whose artifact counter persists in `store`.
    ///
    /// An invalid `cfg` is logged and used as given; range clamps tolerate unordered bounds.
    pub fn new(cfg: EngineConfig, images: ImageStore, store: Box<dyn KvStore>) -> Self {
        if let Err(e) = cfg.validate() {
            tracing::warn!(error = %e, "engine config failed validation");
        }
        let counter = ArtifactCounter::load(store.as_ref(), cfg.history_len);
        Self {
            interaction: Interaction::new(HitConfig::from(&cfg)),
            layers: LayerModel::new(cfg),
            images,
            viewport: None,
            resize: ResizeScheduler::default(),
            dpr: 1.0,
            backend: CpuBackend::new(RenderSettings::default()),
            counter,
            store,
            dirty: true,
        }
    }

    /// Editor with a volatile counter store.
    pub fn in_memory(cfg: EngineConfig) -> Self {
        Self::new(cfg, ImageStore::new(), Box::new(MemoryStore::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        self.layers.config()
    }

    pub fn layers(&self) -> &LayerModel {
        &self.layers
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Images inserted here are released by [`Self::reset`] unless a layer uses them.
    pub fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn cursor(&self) -> Cursor {
        self.interaction.cursor()
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    pub fn counter(&self) -> &ArtifactCounter {
        &self.counter
    }

    /// Queue a layout change; it takes effect at the next [`Self::on_frame`].
    pub fn resize(&mut self, container_w: f64, container_h: f64, dpr: f64) {
        self.dpr = dpr;
        self.resize.request(Size::new(container_w, container_h));
    }

    /// Apply a viewport immediately, bypassing the frame-coalesced path.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.dirty = true;
    }

    /// Frame tick: apply a pending resize and commit coalesced drag moves.
    ///
    /// Returns `true` when the preview should be redrawn.
    pub fn on_frame(&mut self) -> bool {
        if let Some(vp) = self.resize.take(self.dpr, self.layers.config())
            && self.viewport != Some(vp)
        {
            tracing::debug!(css = vp.css_size, dpr = vp.dpr, "viewport changed");
            self.viewport = Some(vp);
            self.dirty = true;
        }
        if self.interaction.on_frame(&mut self.layers) {
            self.dirty = true;
        }
        std::mem::take(&mut self.dirty)
    }

    fn view(&self) -> Option<Size> {
        self.viewport.map(|vp| vp.css())
    }

    fn photo_loaded(&mut self, image: ImageRef) -> ImageRef {
        let previous = self.layers.base().map(|b| b.image.id);
        self.layers.set_base_photo(image.clone());
        if let Some(prev) = previous {
            self.release([prev]);
        }
        self.resize.request_again();
        self.dirty = true;
        image
    }

    /// Use an uploaded image as the base photo. Non-image input is ignored.
    pub fn upload(&mut self, input: UploadInput) -> Option<ImageRef> {
        match ingest_upload(&mut self.images, input) {
            Ok(Some(image)) => Some(self.photo_loaded(image)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "upload rejected");
                None
            }
        }
    }

    pub fn load_photo_path(&mut self, path: &str) -> Option<ImageRef> {
        let image = swallow(self.images.load_path(path), "photo")?;
        Some(self.photo_loaded(image))
    }

    fn overlay_loaded(&mut self, image: ImageRef) -> ImageRef {
        self.interaction.forget_overlay();
        self.layers.add_overlay(image.clone());
        self.dirty = true;
        image
    }

    /// Make the image at `path` the active overlay, freezing the current one.
    pub fn add_overlay_path(&mut self, path: &str) -> Option<ImageRef> {
        let image = swallow(self.images.load_path(path), "overlay")?;
        Some(self.overlay_loaded(image))
    }

    pub fn add_overlay_source(&mut self, source: &OverlaySource) -> Option<ImageRef> {
        self.add_overlay_path(&source.url)
    }

    pub fn add_overlay_bytes(&mut self, source: &str, bytes: &[u8]) -> Option<ImageRef> {
        let image = swallow(self.images.load_bytes(source, bytes), "overlay")?;
        Some(self.overlay_loaded(image))
    }

    pub fn remove_active_overlay(&mut self) {
        self.interaction.forget_overlay();
        self.layers.remove_active_overlay();
        self.dirty = true;
    }

    pub fn update_active_overlay(&mut self, patch: TransformPatch) {
        self.layers.update_active_overlay(patch);
        self.dirty = true;
    }

    /// Slider-style overlay scale edit.
    pub fn set_overlay_scale(&mut self, scale_percent: f64) {
        self.layers.set_overlay_scale(scale_percent);
        self.dirty = true;
    }

    pub fn set_base_transform(&mut self, patch: TransformPatch) {
        self.layers.set_base_transform(patch);
        self.dirty = true;
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.layers.set_focus(focus);
        self.dirty = true;
    }

    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.layers.set_adjustments(adjustments);
        self.dirty = true;
    }

    pub fn update_adjustments(&mut self, f: impl FnOnce(&mut Adjustments)) {
        self.layers.update_adjustments(f);
        self.dirty = true;
    }

    /// Route a pointer event. Ignored until a viewport exists.
    pub fn pointer(&mut self, ev: PointerEvent) {
        let Some(view) = self.view() else {
            return;
        };
        // Focus may change on pointer-down even when no transform does.
        let focus = self.layers.focus();
        if self.interaction.handle(&mut self.layers, view, ev) || self.layers.focus() != focus {
            self.dirty = true;
        }
    }

    /// Update the hover cursor for a pointer at `p`.
    pub fn hover(&mut self, p: Point) -> Cursor {
        match self.view() {
            Some(view) => self.interaction.hover(&self.layers, view, p),
            None => self.interaction.cursor(),
        }
    }

    pub fn key(&mut self, key: Key) {
        if self.interaction.key(&mut self.layers, key) {
            self.dirty = true;
        }
    }

    pub fn wheel(&mut self, delta_y: f64) {
        if self.interaction.wheel(&mut self.layers, delta_y) {
            self.dirty = true;
        }
    }

    /// Destroy photo and overlays, releasing their decoded images.
    /// Viewport and the artifact counter survive.
    pub fn reset(&mut self) {
        self.interaction.reset();
        self.layers.reset();
        let all: Vec<AssetId> = self.images.ids().collect();
        self.release(all);
        self.dirty = true;
    }

    /// Drop the decoded images and pixmaps among `candidates` that no layer references.
    fn release(&mut self, candidates: impl IntoIterator<Item = AssetId>) {
        let live = self.layers.referenced_assets();
        let dead: HashSet<AssetId> = candidates
            .into_iter()
            .filter(|id| !live.contains(id))
            .collect();
        if dead.is_empty() {
            return;
        }
        let evicted = self.images.retain(|id| !dead.contains(&id));
        self.backend.prune_cache(&self.images);
        if evicted > 0 {
            tracing::debug!(evicted, kept = self.images.len(), "released unused images");
        }
    }

    /// Converted pixmaps held by the render backend.
    pub fn cached_pixmaps(&self) -> usize {
        self.backend.cached_images()
    }

    /// Draw the interactive preview, guides included. `None` without a viewport.
    pub fn render_preview(&mut self) -> Option<FrameRGBA> {
        self.render(RenderMode::Preview)
    }

    /// Draw the clean composition without allocating an identifier.
    pub fn render_export(&mut self) -> Option<FrameRGBA> {
        self.render(RenderMode::Export)
    }

    fn render(&mut self, mode: RenderMode) -> Option<FrameRGBA> {
        let vp = self.viewport?;
        let plan = compile_scene(&self.layers, &vp, &self.images, mode, self.layers.config());
        swallow(self.backend.render(&plan, &self.images), "render")
    }

    /// Export the composition into `sink`. `None` without a viewport or on failure.
    pub fn export(&mut self, sink: &mut dyn ArtifactSink) -> Option<ExportedArtifact> {
        export_composition(
            &self.layers,
            self.viewport.as_ref(),
            &self.images,
            &mut self.backend,
            &mut self.counter,
            self.store.as_mut(),
            sink,
        )
    }
}

fn swallow<T>(r: ForgeResult<T>, what: &str) -> Option<T> {
    match r {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, what, "operation skipped");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
