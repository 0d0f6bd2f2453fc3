use kurbo::{Circle, Shape};

use crate::{
    assets::store::{AssetId, ImageRef, ImageStore},
    foundation::{
        config::EngineConfig,
        core::{Affine, BezPath, Point, Rect, Rgba8, Size, Transform},
    },
    interaction::hit::{Corner, OverlayGeometry},
    layers::model::{Focus, LayerModel},
    viewport::sizer::Viewport,
};

const GUIDE_STROKE: f64 = 1.5;
const HANDLE_SIZE: f64 = 10.0;
const ROTATE_MARKER_RADIUS: f64 = 6.0;
const BORDER_WIDTH: f64 = 1.0;
const PATH_TOLERANCE: f64 = 0.1;

/// Whether interactive decorations are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Visible canvas: selection guides and cosmetic border included.
    Preview,
    /// Clean composition as it looks with nothing selected.
    Export,
}

#[derive(Clone, Debug)]
/// Backend-agnostic plan for one frame.
///
/// Passes run in order against a single canvas. Scene passes are rasterized into a fresh
/// layer and composited over the canvas; filter passes rewrite the canvas in place.
/// All draw geometry is in CSS pixels; backends prepend [`Viewport::base_transform`].
pub struct RenderPlan {
    pub viewport: Viewport,
    pub passes: Vec<Pass>,
}

#[derive(Clone, Debug)]
pub enum Pass {
    Scene(ScenePass),
    Filter(Filter),
}

#[derive(Clone, Debug, Default)]
pub struct ScenePass {
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// In-place canvas effect.
pub enum Filter {
    /// CSS `saturate()` amount; 1.0 is identity.
    Saturate(f32),
    /// Separable gaussian blur in buffer pixels.
    Blur { radius_px: u32, sigma: f32 },
    /// Repeating monochrome noise tile composited at `alpha`.
    Noise { alpha: f32, tile_px: u32, seed: u64 },
}

#[derive(Clone, Debug)]
/// Draw operation emitted by [`compile_scene`].
pub enum DrawOp {
    /// Fill the image's own `0..w x 0..h` rect through `transform`.
    Image {
        asset: AssetId,
        transform: Affine,
        opacity: f32,
    },
    FillRect {
        rect: Rect,
        transform: Affine,
        color: Rgba8,
    },
    FillPath {
        path: BezPath,
        transform: Affine,
        color: Rgba8,
    },
}

/// Smallest uniform factor that makes a `image_w x image_h` image cover `view`.
pub fn cover_scale(view: Size, image_w: u32, image_h: u32) -> f64 {
    if image_w == 0 || image_h == 0 {
        return 1.0;
    }
    (view.width / f64::from(image_w)).max(view.height / f64::from(image_h))
}

/// Image-space to CSS-space mapping for the base photo: cover-fit, user scale, then offset.
pub fn photo_transform(view: Size, image: &ImageRef, t: &Transform) -> Affine {
    let k = cover_scale(view, image.width, image.height) * t.scale_percent / 100.0;
    let (w, h) = (f64::from(image.width), f64::from(image.height));
    Affine::translate(t.center(view).to_vec2())
        * Affine::scale(k)
        * Affine::translate((-w / 2.0, -h / 2.0))
}

/// Overlay-local frame: origin at the overlay center, axes rotated with it.
pub fn overlay_frame(view: Size, t: &Transform) -> Affine {
    Affine::translate(t.center(view).to_vec2()) * Affine::rotate(t.rotation_rad())
}

/// Image-space to CSS-space mapping for an overlay stretched over its square box.
pub fn overlay_transform(view: Size, image: &ImageRef, t: &Transform) -> Affine {
    let g = OverlayGeometry::new(view, t);
    let size = g.size();
    let w = f64::from(image.width.max(1));
    let h = f64::from(image.height.max(1));
    overlay_frame(view, t)
        * Affine::translate(-g.half)
        * Affine::scale_non_uniform(size.width / w, size.height / h)
}

/// Axis-aligned CSS-space bounds of an [`DrawOp::Image`] drawn with `transform`.
pub fn image_bounds(transform: Affine, image: &ImageRef) -> Rect {
    let r = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
    transform.transform_rect_bbox(r)
}

fn resolved(images: &ImageStore, image: &ImageRef, layer: &str) -> bool {
    if images.contains(image.id) {
        return true;
    }
    tracing::warn!(layer, source = %image.source, "image not decoded; skipping layer");
    false
}

/// Build the frame plan for `layers` on `viewport`.
///
/// Layers whose image is missing from `images` are skipped; the rest still draw.
#[tracing::instrument(skip_all, fields(mode = ?mode, css = viewport.css_size))]
pub fn compile_scene(
    layers: &LayerModel,
    viewport: &Viewport,
    images: &ImageStore,
    mode: RenderMode,
    cfg: &EngineConfig,
) -> RenderPlan {
    let view = viewport.css();
    let adj = layers.adjustments();
    let mut passes = Vec::new();

    if let Some(base) = layers.base()
        && resolved(images, &base.image, "photo")
    {
        passes.push(Pass::Scene(ScenePass {
            ops: vec![DrawOp::Image {
                asset: base.image.id,
                transform: photo_transform(view, &base.image, &base.transform),
                opacity: 1.0,
            }],
        }));
        let s = (adj.saturation / 100.0) as f32;
        if (s - 1.0).abs() > f32::EPSILON {
            passes.push(Pass::Filter(Filter::Saturate(s)));
        }
        if adj.blur > 0.0 {
            let sigma = adj.blur * viewport.dpr;
            let radius_px = (sigma * 3.0).ceil() as u32;
            if radius_px > 0 {
                passes.push(Pass::Filter(Filter::Blur {
                    radius_px,
                    sigma: sigma as f32,
                }));
            }
        }
    }

    if adj.tint_opacity > 0.0 {
        let a = (adj.tint_opacity / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8;
        passes.push(Pass::Scene(ScenePass {
            ops: vec![DrawOp::FillRect {
                rect: Rect::from_origin_size(Point::ORIGIN, view),
                transform: Affine::IDENTITY,
                color: Rgba8::from_hue(adj.tint_hue).with_alpha(a),
            }],
        }));
    }

    if adj.noise > 0.0 {
        let alpha = ((adj.noise / 100.0) as f32 * cfg.noise_max_alpha).min(cfg.noise_max_alpha);
        passes.push(Pass::Filter(Filter::Noise {
            alpha,
            tile_px: cfg.noise_tile_px,
            seed: cfg.noise_seed,
        }));
    }

    let mut ops = Vec::new();
    for frozen in layers.frozen() {
        if resolved(images, frozen.image(), "frozen overlay") {
            ops.push(DrawOp::Image {
                asset: frozen.image().id,
                transform: overlay_transform(view, frozen.image(), &frozen.transform()),
                opacity: 1.0,
            });
        }
    }
    if let Some(active) = layers.active_overlay() {
        if resolved(images, &active.image, "overlay") {
            ops.push(DrawOp::Image {
                asset: active.image.id,
                transform: overlay_transform(view, &active.image, &active.transform),
                opacity: 1.0,
            });
        }
        if mode == RenderMode::Preview && layers.focus() == Focus::Overlay {
            push_guides(&mut ops, view, &active.transform, cfg);
        }
    }
    if mode == RenderMode::Preview {
        push_border(&mut ops, view, cfg.border_color);
    }
    if !ops.is_empty() {
        passes.push(Pass::Scene(ScenePass { ops }));
    }

    tracing::trace!(passes = passes.len(), "scene compiled");
    RenderPlan {
        viewport: *viewport,
        passes,
    }
}

/// Box outline, corner squares and rotate marker, drawn in the overlay's local frame.
fn push_guides(ops: &mut Vec<DrawOp>, view: Size, t: &Transform, cfg: &EngineConfig) {
    let g = OverlayGeometry::new(view, t);
    let frame = overlay_frame(view, t);
    let color = cfg.guide_color;
    let (hx, hy) = (g.half.x, g.half.y);
    let s = GUIDE_STROKE / 2.0;

    let mut rect = |rect: Rect| {
        ops.push(DrawOp::FillRect {
            rect,
            transform: frame,
            color,
        })
    };
    rect(Rect::new(-hx - s, -hy - s, hx + s, -hy + s));
    rect(Rect::new(-hx - s, hy - s, hx + s, hy + s));
    rect(Rect::new(-hx - s, -hy + s, -hx + s, hy - s));
    rect(Rect::new(hx - s, -hy + s, hx + s, hy - s));
    for c in Corner::ALL {
        let p = g.corner_local(c).to_point();
        rect(Rect::from_center_size(p, (HANDLE_SIZE, HANDLE_SIZE)));
    }
    let marker = g.rotate_handle_local(cfg.rotate_handle_offset);
    rect(Rect::new(-s, marker.y + ROTATE_MARKER_RADIUS, s, -hy - s));

    ops.push(DrawOp::FillPath {
        path: Circle::new(marker.to_point(), ROTATE_MARKER_RADIUS).to_path(PATH_TOLERANCE),
        transform: frame,
        color,
    });
}

/// One CSS pixel frame along the canvas edge, on whole-pixel boundaries.
fn push_border(ops: &mut Vec<DrawOp>, view: Size, color: Rgba8) {
    let (w, h, b) = (view.width, view.height, BORDER_WIDTH);
    for rect in [
        Rect::new(0.0, 0.0, w, b),
        Rect::new(0.0, h - b, w, h),
        Rect::new(0.0, b, b, h - b),
        Rect::new(w - b, b, w, h - b),
    ] {
        ops.push(DrawOp::FillRect {
            rect,
            transform: Affine::IDENTITY,
            color,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compile.rs"]
mod tests;
