use std::path::Path;

use crate::{
    audio::gain::VolumeControl,
    foundation::error::{PlayerError, PlayerResult},
    media::ffmpeg::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo},
};

/// The single looping music bed.
#[derive(Clone, Debug)]
pub struct BackgroundTrack {
    pcm: AudioPcm,
    cursor_frame: usize,
}

impl BackgroundTrack {
    /// Decode `path` to stereo PCM at [`MIX_SAMPLE_RATE`]. Failures are [`PlayerError::AudioLoad`].
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> PlayerResult<Self> {
        if !path.exists() {
            return Err(PlayerError::audio_load(format!(
                "music file '{}' does not exist",
                path.display()
            )));
        }
        let pcm = decode_audio_f32_stereo(path, MIX_SAMPLE_RATE)?;
        let track = Self::from_pcm(pcm)?;
        tracing::info!(
            frames = track.pcm.frames(),
            seconds = track.duration_secs(),
            "background track loaded"
        );
        Ok(track)
    }

    pub fn from_pcm(pcm: AudioPcm) -> PlayerResult<Self> {
        if pcm.channels == 0 || pcm.sample_rate == 0 {
            return Err(PlayerError::audio_load(
                "music pcm needs at least one channel and a sample rate",
            ));
        }
        if pcm.frames() == 0 {
            return Err(PlayerError::audio_load("music pcm is empty"));
        }
        Ok(Self {
            pcm,
            cursor_frame: 0,
        })
    }

    pub fn channels(&self) -> u16 {
        self.pcm.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.pcm.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.pcm.frames() as f64 / f64::from(self.pcm.sample_rate)
    }

    /// Playback position within the loop.
    pub fn position_secs(&self) -> f64 {
        self.cursor_frame as f64 / f64::from(self.pcm.sample_rate)
    }

    /// Fill `out` (interleaved, this track's channel count) with the next samples, wrapping at the
    /// end of the loop, then run them through `gain`.
    pub fn render_into(&mut self, out: &mut [f32], gain: &mut dyn VolumeControl) {
        let channels = usize::from(self.pcm.channels);
        let total = self.pcm.frames();
        for frame in out.chunks_mut(channels) {
            let src = self.cursor_frame * channels;
            let len = frame.len();
            frame.copy_from_slice(&self.pcm.interleaved_f32[src..src + len]);
            self.cursor_frame = (self.cursor_frame + 1) % total;
        }
        gain.process(out, self.pcm.channels);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
