use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    foundation::{
        core::{Affine, Canvas, Point},
        error::PlayerResult,
    },
    media::frame::VisualFrame,
    render::{
        frame::FrameRGBA,
        renderer::{RenderSettings, TextureSlot, TransitionRenderer, ZoomUniforms},
        sample::{sample_bilinear, to_u8},
    },
};

/// Software zoom-transition renderer; evaluates the blend per pixel, rows in parallel.
pub struct CpuZoomRenderer {
    settings: RenderSettings,
    slots: HashMap<TextureSlot, VisualFrame>,
}

impl CpuZoomRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            slots: HashMap::new(),
        }
    }
}

impl TransitionRenderer for CpuZoomRenderer {
    fn backend_name(&self) -> &'static str {
        "cpu"
    }

    fn set_source(&mut self, slot: TextureSlot, frame: &VisualFrame) -> bool {
        if !frame.is_decodable() {
            tracing::debug!(?slot, "skipping undecodable frame");
            return false;
        }
        self.slots.insert(slot, frame.clone());
        true
    }

    fn has_source(&self, slot: TextureSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    fn render_frame(&mut self, progress: f32, canvas: Canvas) -> PlayerResult<FrameRGBA> {
        let uniforms = ZoomUniforms::new(progress, self.settings.target_zoom, canvas);
        let from = self.slots.get(&TextureSlot::From);
        let to = self.slots.get(&TextureSlot::To);
        let (from, to) = match (from, to) {
            (Some(f), Some(t)) => (f, t),
            (Some(only), None) | (None, Some(only)) => (only, only),
            (None, None) => return Ok(FrameRGBA::filled(canvas, self.settings.clear_rgba)),
        };

        let from_uv = Affine::scale_about(f64::from(uniforms.from_uv_scale()), Point::new(0.5, 0.5));
        let m = uniforms.mix_factor();
        let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));

        let mut data = vec![0u8; canvas.byte_len()];
        data.par_chunks_mut(canvas.width as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f64 + 0.5) / ch;
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let u = (x as f64 + 0.5) / cw;
                    let zoomed = from_uv * Point::new(u, v);
                    let a = sample_bilinear(from, zoomed.x, zoomed.y);
                    let b = sample_bilinear(to, u, v);
                    let mut out = [0.0f32; 4];
                    for c in 0..4 {
                        out[c] = a[c] + (b[c] - a[c]) * m;
                    }
                    px.copy_from_slice(&to_u8(out));
                }
            });

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
