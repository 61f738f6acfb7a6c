use crate::media::frame::VisualFrame;

/// Bilinear texture fetch with clamp-to-edge addressing, in normalized `[0, 1]` UV space.
///
/// Returns premultiplied channels as `f32` in `[0, 255]`.
pub(crate) fn sample_bilinear(frame: &VisualFrame, u: f64, v: f64) -> [f32; 4] {
    let w = frame.width as usize;
    let h = frame.height as usize;
    let data = frame.rgba8_premul.as_slice();

    // Texel centers sit at (i + 0.5) / size.
    let x = (u * w as f64 - 0.5).clamp(0.0, (w - 1) as f64);
    let y = (v * h as f64 - 0.5).clamp(0.0, (h - 1) as f64);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let texel = |xi: usize, yi: usize| -> [f32; 4] {
        let i = (yi * w + xi) * 4;
        [
            f32::from(data[i]),
            f32::from(data[i + 1]),
            f32::from(data[i + 2]),
            f32::from(data[i + 3]),
        ]
    };

    let p00 = texel(x0, y0);
    let p10 = texel(x1, y0);
    let p01 = texel(x0, y1);
    let p11 = texel(x1, y1);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * fx;
        let bottom = p01[c] + (p11[c] - p01[c]) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}

pub(crate) fn to_u8(px: [f32; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = px[c].round().clamp(0.0, 255.0) as u8;
    }
    // Premultiplied invariant: color never exceeds alpha.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    out
}
