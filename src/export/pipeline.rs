//! One-shot export: allocate an identifier, re-render without decorations, encode, deliver.

use std::{io::Cursor, path::PathBuf};

use anyhow::Context;

use crate::{
    assets::{decode::unpremultiply_rgba8_in_place, store::ImageStore},
    export::{
        ident::{ArtifactCounter, ArtifactId},
        storage::KvStore,
    },
    foundation::error::{ForgeError, ForgeResult},
    layers::model::LayerModel,
    render::{
        FrameRGBA, RenderBackend,
        compile::{RenderMode, compile_scene},
    },
    viewport::sizer::Viewport,
};

/// Encode a frame as PNG with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> ForgeResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| ForgeError::render("frame buffer does not match its dimensions"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// `<prefix>_<4-digit-id>.png`
pub fn artifact_file_name(prefix: &str, id: ArtifactId) -> String {
    format!("{prefix}_{id}.png")
}

/// Destination for encoded artifacts.
pub trait ArtifactSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> ForgeResult<()>;
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ArtifactSink for DirSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> ForgeResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.path_for(file_name);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl ArtifactSink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> ForgeResult<()> {
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedArtifact {
    pub id: ArtifactId,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// Export the composition as it looks with nothing selected.
///
/// Returns `None` without a viewport or when rendering, encoding or delivery fails;
/// failures are logged, never propagated.
#[tracing::instrument(skip_all)]
pub fn export_composition(
    layers: &LayerModel,
    viewport: Option<&Viewport>,
    images: &ImageStore,
    backend: &mut dyn RenderBackend,
    counter: &mut ArtifactCounter,
    store: &mut dyn KvStore,
    sink: &mut dyn ArtifactSink,
) -> Option<ExportedArtifact> {
    let Some(viewport) = viewport else {
        tracing::debug!("no render target; export skipped");
        return None;
    };

    let id = counter.allocate();
    if let Err(e) = counter.persist(store) {
        tracing::warn!(error = %e, "could not persist artifact counter");
    }

    match render_and_deliver(layers, viewport, images, backend, sink, id) {
        Ok(artifact) => {
            tracing::info!(file = %artifact.file_name, "exported");
            Some(artifact)
        }
        Err(e) => {
            tracing::warn!(error = %e, id = %id, "export failed");
            None
        }
    }
}

fn render_and_deliver(
    layers: &LayerModel,
    viewport: &Viewport,
    images: &ImageStore,
    backend: &mut dyn RenderBackend,
    sink: &mut dyn ArtifactSink,
    id: ArtifactId,
) -> ForgeResult<ExportedArtifact> {
    let cfg = layers.config();
    let plan = compile_scene(layers, viewport, images, RenderMode::Export, cfg);
    let frame = backend.render(&plan, images)?;
    let png = encode_png(&frame)?;
    let file_name = artifact_file_name(&cfg.export_prefix, id);
    sink.deliver(&file_name, &png)?;
    Ok(ExportedArtifact {
        id,
        file_name,
        width: frame.width,
        height: frame.height,
        byte_len: png.len(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
