/// How the background track's loudness is controlled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeMode {
    /// Set the element's own volume, applied uniformly per block.
    #[default]
    Element,
    /// Route samples through an explicit gain stage that interpolates across each block.
    ///
    /// For platforms where element volume is fixed.
    GainNode,
}

/// Mechanism that turns a volume value into attenuated samples.
///
/// The ducker only ever calls [`VolumeControl::set_volume`]; hosts pull audio through
/// [`VolumeControl::process`].
pub trait VolumeControl {
    fn mode(&self) -> VolumeMode;

    /// Requested gain in `[0, 1]`. Out-of-range and NaN values are clamped.
    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// Attenuate interleaved samples in place.
    fn process(&mut self, samples: &mut [f32], channels: u16);
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Direct element-level volume.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementVolume {
    volume: f32,
}

impl ElementVolume {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: clamp_volume(volume),
        }
    }
}

impl VolumeControl for ElementVolume {
    fn mode(&self) -> VolumeMode {
        VolumeMode::Element
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn process(&mut self, samples: &mut [f32], _channels: u16) {
        for s in samples.iter_mut() {
            *s *= self.volume;
        }
    }
}

/// Gain stage over PCM. Each processed block ramps linearly from the gain applied at the end of the
/// previous block to the current target, so volume changes never click.
#[derive(Clone, Debug, PartialEq)]
pub struct GainNode {
    target: f32,
    applied: f32,
}

impl GainNode {
    pub fn new(volume: f32) -> Self {
        let v = clamp_volume(volume);
        Self {
            target: v,
            applied: v,
        }
    }

    /// Gain reached at the end of the last processed block.
    pub fn applied_gain(&self) -> f32 {
        self.applied
    }
}

impl VolumeControl for GainNode {
    fn mode(&self) -> VolumeMode {
        VolumeMode::GainNode
    }

    fn set_volume(&mut self, volume: f32) {
        self.target = clamp_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.target
    }

    fn process(&mut self, samples: &mut [f32], channels: u16) {
        let channels = usize::from(channels.max(1));
        let frames = samples.len() / channels;
        if frames == 0 {
            return;
        }
        let start = self.applied;
        let step = (self.target - start) / frames as f32;
        for (i, frame) in samples.chunks_mut(channels).enumerate() {
            let g = start + step * (i + 1) as f32;
            for s in frame {
                *s *= g;
            }
        }
        self.applied = self.target;
    }
}

/// Build the volume mechanism for `mode`, starting at `volume`.
pub fn create_volume_control(mode: VolumeMode, volume: f32) -> Box<dyn VolumeControl> {
    match mode {
        VolumeMode::Element => Box::new(ElementVolume::new(volume)),
        VolumeMode::GainNode => Box::new(GainNode::new(volume)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/gain.rs"]
mod tests;
