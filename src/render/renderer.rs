use crate::{
    foundation::{
        core::Canvas,
        error::{PlayerError, PlayerResult},
    },
    media::frame::VisualFrame,
    render::frame::FrameRGBA,
};

/// The two texture slots a transition blends between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    From,
    To,
}

/// Per-frame shader parameters.
///
/// `aspect` is not used by the zoom effect but is part of the uniform contract so other effects
/// can be added without changing callers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomUniforms {
    pub progress: f32,
    pub target_zoom: f32,
    pub aspect: f32,
}

impl ZoomUniforms {
    pub fn new(progress: f32, target_zoom: f32, canvas: Canvas) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        Self {
            progress,
            target_zoom,
            aspect: canvas.aspect(),
        }
    }

    /// UV scale applied to the "from" texture: `1.0` at progress 0, `target_zoom` at 1.
    pub fn from_uv_scale(self) -> f32 {
        1.0 + (self.target_zoom - 1.0) * self.progress
    }

    /// Eased weight of the "to" texture.
    pub fn mix_factor(self) -> f32 {
        crate::foundation::math::smoothstep(0.0, 1.0, self.progress)
    }

    pub(crate) fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.progress.to_le_bytes());
        out[4..8].copy_from_slice(&self.target_zoom.to_le_bytes());
        out[8..12].copy_from_slice(&self.aspect.to_le_bytes());
        out
    }
}

/// Settings shared by all renderer backends.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Zoom reached by the outgoing frame at the end of a transition (`< 1.0` zooms in).
    pub target_zoom: f32,
    /// Color used before any source has been uploaded.
    pub clear_rgba: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            target_zoom: 0.9,
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

/// Composites two frames into one, driven by a blend parameter.
///
/// When idle the controller drives it with `progress = 0` and the same frame in both slots, which
/// degenerates to a pass-through of the current frame.
pub trait TransitionRenderer {
    /// Short backend label for logs.
    fn backend_name(&self) -> &'static str;

    /// Upload `frame` into `slot`. Frames that are not decodable yet are skipped (returns `false`)
    /// and the slot keeps its last valid upload.
    fn set_source(&mut self, slot: TextureSlot, frame: &VisualFrame) -> bool;

    /// Whether `slot` holds a valid upload.
    fn has_source(&self, slot: TextureSlot) -> bool;

    /// Run the blend for `progress` into a `canvas`-sized frame.
    fn render_frame(&mut self, progress: f32, canvas: Canvas) -> PlayerResult<FrameRGBA>;
}

/// Available renderer backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Software renderer, always available.
    #[default]
    Cpu,
    /// wgpu renderer (feature `gpu`).
    Gpu,
}

/// Create a transition renderer.
///
/// Fails with [`PlayerError::RendererInit`] when the graphics context cannot be created; there is
/// no silent fallback to another backend.
pub fn create_renderer(
    kind: RendererKind,
    settings: &RenderSettings,
) -> PlayerResult<Box<dyn TransitionRenderer>> {
    if !settings.target_zoom.is_finite() || settings.target_zoom <= 0.0 {
        return Err(PlayerError::renderer_init(
            "target_zoom must be finite and > 0",
        ));
    }
    match kind {
        RendererKind::Cpu => Ok(Box::new(crate::render::cpu::CpuZoomRenderer::new(
            settings.clone(),
        ))),
        #[cfg(feature = "gpu")]
        RendererKind::Gpu => Ok(Box::new(crate::render::gpu::GpuZoomRenderer::new(
            settings.clone(),
        )?)),
        #[cfg(not(feature = "gpu"))]
        RendererKind::Gpu => Err(PlayerError::renderer_init(
            "built without the 'gpu' feature",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
