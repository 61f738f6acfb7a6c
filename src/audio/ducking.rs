use std::time::Duration;

use crate::{
    animation::ease::Ease,
    audio::gain::VolumeControl,
    foundation::{
        core::secs_between,
        error::{PlayerError, PlayerResult},
        math::lerp,
    },
    playlist::entry::MediaKind,
};

/// Background music levels per content kind, plus the ramp length between them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuckingConfig {
    /// Music level while a video (with its own sound) is current.
    pub video: f32,
    /// Music level while a still image is current.
    pub image: f32,
    pub ramp_ms: u64,
    /// Curve the level follows during a ramp.
    pub ease: Ease,
}

impl Default for DuckingConfig {
    fn default() -> Self {
        Self {
            video: 0.15,
            image: 0.6,
            ramp_ms: 500,
            ease: Ease::InOutQuad,
        }
    }
}

impl DuckingConfig {
    pub fn target_for(&self, kind: MediaKind) -> f32 {
        match kind {
            MediaKind::Video => self.video,
            MediaKind::Image => self.image,
        }
    }

    pub fn ramp(&self) -> Duration {
        Duration::from_millis(self.ramp_ms)
    }

    pub fn validate(&self) -> PlayerResult<()> {
        for (name, v) in [("video", self.video), ("image", self.image)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(PlayerError::validation(format!(
                    "ducking.{name} must be within [0, 1]"
                )));
            }
        }
        if self.ramp_ms == 0 {
            return Err(PlayerError::validation("ducking.ramp_ms must be > 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Ramp {
    from: f32,
    to: f32,
    started_at: Duration,
}

/// Eases the background track's gain toward the level for the current content kind.
///
/// The realized level is a function of time, so retargeting mid-ramp starts from wherever the
/// previous ramp had got to instead of jumping.
pub struct AudioDucker {
    config: DuckingConfig,
    level: f32,
    target: f32,
    target_kind: Option<MediaKind>,
    ramp: Option<Ramp>,
    muted: bool,
    playing: bool,
    control: Box<dyn VolumeControl>,
}

impl AudioDucker {
    /// Starts silent with no target kind; the first [`AudioDucker::set_target_kind`] fades in.
    pub fn new(config: DuckingConfig, mut control: Box<dyn VolumeControl>) -> Self {
        control.set_volume(0.0);
        Self {
            config,
            level: 0.0,
            target: 0.0,
            target_kind: None,
            ramp: None,
            muted: false,
            playing: false,
            control,
        }
    }

    /// Begin a ramp from the current interpolated level to the level for `kind`.
    pub fn set_target_kind(&mut self, kind: MediaKind, now: Duration) {
        let from = self.level_at(now);
        let to = self.config.target_for(kind);
        self.level = from;
        self.target = to;
        self.target_kind = Some(kind);
        self.ramp = Some(Ramp {
            from,
            to,
            started_at: now,
        });
        tracing::debug!(%kind, from, to, "ducking retarget");
    }

    /// Unmuted level at `now`.
    pub fn level_at(&self, now: Duration) -> f32 {
        let Some(ramp) = self.ramp else {
            return self.level;
        };
        let total = self.config.ramp().as_secs_f64();
        let t = if total > 0.0 {
            secs_between(ramp.started_at, now) / total
        } else {
            1.0
        };
        if t >= 1.0 {
            return ramp.to;
        }
        lerp(f64::from(ramp.from), f64::from(ramp.to), self.config.ease.apply(t)) as f32
    }

    /// Advance to `now` and push the output level into the volume control. Returns that level.
    pub fn update(&mut self, now: Duration) -> f32 {
        self.level = self.level_at(now);
        if self.ramp.is_some() && !self.is_ramping(now) {
            self.ramp = None;
        }
        let out = self.output_for(self.level);
        self.control.set_volume(out);
        out
    }

    pub fn is_ramping(&self, now: Duration) -> bool {
        self.ramp
            .is_some_and(|r| now.saturating_sub(r.started_at) < self.config.ramp())
    }

    /// Mirror the controller's play state.
    pub fn sync_playback(&mut self, is_playing: bool) {
        if self.playing != is_playing {
            tracing::debug!(is_playing, "background track play state");
        }
        self.playing = is_playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Muting keeps the target and the ramp; only the output is silenced.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        let out = self.output_for(self.level);
        self.control.set_volume(out);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn target_kind(&self) -> Option<MediaKind> {
        self.target_kind
    }

    /// Level last pushed to the volume control.
    pub fn output_volume(&self) -> f32 {
        self.control.volume()
    }

    pub fn control_mut(&mut self) -> &mut dyn VolumeControl {
        self.control.as_mut()
    }

    fn output_for(&self, level: f32) -> f32 {
        if self.muted { 0.0 } else { level }
    }
}

impl std::fmt::Debug for AudioDucker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDucker")
            .field("level", &self.level)
            .field("target", &self.target)
            .field("muted", &self.muted)
            .field("playing", &self.playing)
            .field("mode", &self.control.mode())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/ducking.rs"]
mod tests;
