use rayon::prelude::*;

use crate::{
    foundation::core::{Canvas, Size},
    media::frame::VisualFrame,
    render::{
        frame::FrameRGBA,
        sample::{sample_bilinear, to_u8},
    },
};

/// Largest size with `natural`'s aspect ratio that fits inside `bound`, never above `natural`.
///
/// Dimensions are rounded and kept at least 1px.
pub fn fit_within(natural: Size, bound: Size) -> Canvas {
    if natural.width <= 0.0 || natural.height <= 0.0 || bound.width <= 0.0 || bound.height <= 0.0
    {
        return Canvas {
            width: 1,
            height: 1,
        };
    }
    let scale = (bound.width / natural.width)
        .min(bound.height / natural.height)
        .min(1.0);
    Canvas {
        width: (natural.width * scale).round().max(1.0) as u32,
        height: (natural.height * scale).round().max(1.0) as u32,
    }
}

/// Output surface for `natural` in a `viewport`, further bounded by `max`.
pub fn surface_for(natural: (u32, u32), viewport: Canvas, max: Canvas) -> Canvas {
    let bound = Size::new(
        f64::from(viewport.width.min(max.width)),
        f64::from(viewport.height.min(max.height)),
    );
    fit_within(Size::new(f64::from(natural.0), f64::from(natural.1)), bound)
}

/// Resample `frame` onto `canvas` without any blending. Used when no transition renderer exists.
pub fn scale_frame(frame: &VisualFrame, canvas: Canvas) -> FrameRGBA {
    if !frame.is_decodable() {
        return FrameRGBA::filled(canvas, [0, 0, 0, 255]);
    }
    let mut data = vec![0u8; canvas.byte_len()];
    let w = canvas.width as usize;
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    data.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let v = (y as f64 + 0.5) / ch;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let u = (x as f64 + 0.5) / cw;
            px.copy_from_slice(&to_u8(sample_bilinear(frame, u, v)));
        }
    });
    FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data,
        premultiplied: true,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
