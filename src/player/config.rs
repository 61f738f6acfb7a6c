use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::{
    audio::{ducking::DuckingConfig, gain::VolumeMode},
    foundation::error::{PlayerError, PlayerResult},
    player::unlock::UnlockStrategy,
    render::renderer::{RenderSettings, RendererKind},
    session::playback::AutoplayPolicy,
};

fn default_lead_ms() -> u64 {
    250
}

/// What starts an automatic advance to the next entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdvanceTrigger {
    /// The current item reached its end.
    #[default]
    OnEnd,
    /// Remaining time dropped below `lead_ms`; fires at most once per item.
    Early {
        #[serde(default = "default_lead_ms")]
        lead_ms: u64,
    },
}

impl AdvanceTrigger {
    pub fn early() -> Self {
        Self::Early {
            lead_ms: default_lead_ms(),
        }
    }

    pub(crate) fn lead_secs(self) -> Option<f64> {
        match self {
            Self::OnEnd => None,
            Self::Early { lead_ms } => Some(Duration::from_millis(lead_ms).as_secs_f64()),
        }
    }
}

/// Player configuration. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Length of the zoom transition.
    pub transition_ms: u64,
    /// Zoom the outgoing frame reaches at the end of a transition.
    pub target_zoom: f32,
    pub advance: AdvanceTrigger,
    pub ducking: DuckingConfig,
    pub volume_mode: VolumeMode,
    pub unlock: UnlockStrategy,
    pub autoplay: AutoplayPolicy,
    pub renderer: RendererKind,
    pub max_width: u32,
    pub max_height: u32,
    pub seek_step_secs: f64,
    /// Optional looping background music.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            transition_ms: 1000,
            target_zoom: 0.9,
            advance: AdvanceTrigger::OnEnd,
            ducking: DuckingConfig::default(),
            volume_mode: VolumeMode::Element,
            unlock: UnlockStrategy::HelperVideo,
            autoplay: AutoplayPolicy::RequiresGesture,
            renderer: RendererKind::Cpu,
            max_width: 1280,
            max_height: 720,
            seek_step_secs: 10.0,
            music: None,
        }
    }
}

impl PlayerConfig {
    pub fn from_json_str(json: &str) -> PlayerResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PlayerError::serde(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> PlayerResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read player config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> PlayerResult<()> {
        if self.transition_ms == 0 {
            return Err(PlayerError::validation("transition_ms must be > 0"));
        }
        if !self.target_zoom.is_finite() || self.target_zoom <= 0.0 {
            return Err(PlayerError::validation(
                "target_zoom must be finite and > 0",
            ));
        }
        self.ducking.validate()?;
        if self.max_width == 0 || self.max_height == 0 {
            return Err(PlayerError::validation(
                "max_width/max_height must be > 0",
            ));
        }
        if !self.seek_step_secs.is_finite() || self.seek_step_secs <= 0.0 {
            return Err(PlayerError::validation(
                "seek_step_secs must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            target_zoom: self.target_zoom,
            ..RenderSettings::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/config.rs"]
mod tests;
