pub(crate) mod compile;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod filters;

use crate::{
    assets::store::ImageStore, foundation::error::ForgeResult, render::compile::RenderPlan,
};

/// A rendered frame in row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Executes a [`RenderPlan`] against decoded images.
pub trait RenderBackend {
    fn render(&mut self, plan: &RenderPlan, images: &ImageStore) -> ForgeResult<FrameRGBA>;
}

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Straight-alpha color the surface is cleared to before the first pass.
    pub clear_rgba: Option<[u8; 4]>,
}
