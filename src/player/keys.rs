use std::str::FromStr;

use crate::foundation::error::PlayerError;

/// Keyboard input the player reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl FromStr for Key {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(Self::Space),
            "left" | "arrowleft" => Ok(Self::ArrowLeft),
            "right" | "arrowright" => Ok(Self::ArrowRight),
            "up" | "arrowup" => Ok(Self::ArrowUp),
            "down" | "arrowdown" => Ok(Self::ArrowDown),
            other => Err(PlayerError::validation(format!("unknown key '{other}'"))),
        }
    }
}

/// A control action, independent of how it was triggered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    /// Relative seek in seconds.
    SeekBy(f64),
    Previous,
    Next,
}

impl PlayerCommand {
    /// Binding: space toggles play, left/right seek by `seek_step_secs`, up/down step the playlist.
    pub fn for_key(key: Key, seek_step_secs: f64) -> Self {
        match key {
            Key::Space => Self::TogglePlay,
            Key::ArrowLeft => Self::SeekBy(-seek_step_secs),
            Key::ArrowRight => Self::SeekBy(seek_step_secs),
            Key::ArrowUp => Self::Previous,
            Key::ArrowDown => Self::Next,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/keys.rs"]
mod tests;
