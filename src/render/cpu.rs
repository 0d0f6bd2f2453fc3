use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::store::{AssetId, ImageStore, PreparedImage},
    foundation::{
        core::{Affine, BezPath, Point, Rgba8},
        error::{ForgeError, ForgeResult},
    },
    render::{
        FrameRGBA, RenderBackend, RenderSettings,
        compile::{DrawOp, Filter, Pass, RenderPlan},
        composite::composite_layer,
        filters,
    },
};

/// Software rasterizer built on `vello_cpu`.
///
/// Decoded images are converted to pixmaps once and reused across frames for as long as
/// the store keeps the same pixel buffer; noise tiles are generated once per `(seed, size)`.
pub struct CpuBackend {
    settings: RenderSettings,
    image_cache: HashMap<AssetId, CachedPaint>,
    noise_cache: HashMap<(u64, u32), Arc<Vec<u8>>>,
}

/// Pixmap paint plus the store buffer it was converted from.
struct CachedPaint {
    pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            image_cache: HashMap::new(),
            noise_cache: HashMap::new(),
        }
    }

    /// Drop converted pixmaps whose image is gone from `images` or was replaced there.
    pub fn prune_cache(&mut self, images: &ImageStore) {
        self.image_cache.retain(|id, cached| {
            images
                .get(*id)
                .is_some_and(|img| Arc::ptr_eq(&img.rgba8_premul, &cached.pixels))
        });
    }

    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    fn image_paint_for(
        &mut self,
        id: AssetId,
        images: &ImageStore,
    ) -> ForgeResult<vello_cpu::Image> {
        let img = images
            .get(id)
            .ok_or_else(|| ForgeError::render(format!("image {:#x} is not loaded", id.0)))?;
        if let Some(cached) = self.image_cache.get(&id)
            && Arc::ptr_eq(&cached.pixels, &img.rgba8_premul)
        {
            return Ok(cached.paint.clone());
        }
        let pixmap = image_to_pixmap(img)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(
            id,
            CachedPaint {
                pixels: img.rgba8_premul.clone(),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    fn noise_tile_for(&mut self, seed: u64, tile_px: u32) -> Arc<Vec<u8>> {
        self.noise_cache
            .entry((seed, tile_px))
            .or_insert_with(|| Arc::new(filters::noise_tile(tile_px, seed)))
            .clone()
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        base: Affine,
        images: &ImageStore,
    ) -> ForgeResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::Image {
                asset,
                transform,
                opacity,
            } => {
                let paint = self.image_paint_for(*asset, images)?;
                let (w, h) = image_paint_size(&paint)?;
                ctx.set_transform(affine_to_cpu(base * *transform));
                ctx.set_paint(paint);
                if *opacity < 1.0 {
                    ctx.push_opacity_layer(*opacity);
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                if *opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
            DrawOp::FillRect {
                rect,
                transform,
                color,
            } => {
                ctx.set_transform(affine_to_cpu(base * *transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
            }
            DrawOp::FillPath {
                path,
                transform,
                color,
            } => {
                ctx.set_transform(affine_to_cpu(base * *transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
        }
        Ok(())
    }

    fn apply_filter(
        &mut self,
        canvas: &mut vello_cpu::Pixmap,
        side: u32,
        filter: Filter,
    ) -> ForgeResult<()> {
        match filter {
            Filter::Saturate(amount) => {
                filters::saturate_in_place(canvas.data_as_u8_slice_mut(), amount);
            }
            Filter::Blur { radius_px, sigma } => {
                let blurred = filters::blur_rgba8_premul(
                    canvas.data_as_u8_slice(),
                    side,
                    side,
                    radius_px,
                    sigma,
                )?;
                canvas.data_as_u8_slice_mut().copy_from_slice(&blurred);
            }
            Filter::Noise {
                alpha,
                tile_px,
                seed,
            } => {
                let tile = self.noise_tile_for(seed, tile_px);
                filters::apply_noise_in_place(
                    canvas.data_as_u8_slice_mut(),
                    side,
                    side,
                    &tile,
                    tile_px,
                    alpha,
                )?;
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(passes = plan.passes.len()))]
    fn render(&mut self, plan: &RenderPlan, images: &ImageStore) -> ForgeResult<FrameRGBA> {
        let side = plan.viewport.buffer_px();
        let side_u16: u16 = side
            .try_into()
            .map_err(|_| ForgeError::render("surface size exceeds u16"))?;
        if side_u16 == 0 {
            return Err(ForgeError::render("surface size is zero"));
        }

        let mut canvas = vello_cpu::Pixmap::new(side_u16, side_u16);
        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            clear_pixmap(&mut canvas, Rgba8::new(r, g, b, a).premultiplied());
        }

        let base = plan.viewport.base_transform();
        for pass in &plan.passes {
            match pass {
                Pass::Scene(scene) => {
                    let mut layer = vello_cpu::Pixmap::new(side_u16, side_u16);
                    let mut ctx = vello_cpu::RenderContext::new(side_u16, side_u16);
                    for op in &scene.ops {
                        self.draw_op(&mut ctx, op, base, images)?;
                    }
                    ctx.flush();
                    ctx.render_to_pixmap(&mut layer);
                    composite_layer(canvas.data_as_u8_slice_mut(), layer.data_as_u8_slice())?;
                }
                Pass::Filter(filter) => self.apply_filter(&mut canvas, side, *filter)?,
            }
        }

        Ok(FrameRGBA {
            width: side,
            height: side,
            data: canvas.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, premul: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&premul);
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_to_pixmap(img: &PreparedImage) -> ForgeResult<vello_cpu::Pixmap> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| ForgeError::render("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| ForgeError::render("image height exceeds u16"))?;
    if img.rgba8_premul.len() != img.width as usize * img.height as usize * 4 {
        return Err(ForgeError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint_size(image: &vello_cpu::Image) -> ForgeResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(ForgeError::render(
            "cpu backend does not support opaque image ids",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
