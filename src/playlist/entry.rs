use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PlayerError, PlayerResult};

/// Display time used for image entries that do not set `display_seconds`.
pub const DEFAULT_IMAGE_SECONDS: f64 = 5.0;

/// What kind of visual resource an entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of the fixed playlist.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaylistEntry {
    pub url: String,
    pub kind: MediaKind,
    /// Only meaningful for images; videos take their duration from the decoded resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_seconds: Option<f64>,
}

impl PlaylistEntry {
    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Video,
            display_seconds: None,
        }
    }

    pub fn image(url: impl Into<String>, display_seconds: f64) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Image,
            display_seconds: Some(display_seconds),
        }
    }

    /// Effective display time for image entries.
    pub fn image_seconds(&self) -> f64 {
        self.display_seconds.unwrap_or(DEFAULT_IMAGE_SECONDS)
    }

    pub fn validate(&self) -> PlayerResult<()> {
        if self.url.trim().is_empty() {
            return Err(PlayerError::validation("playlist entry url must be non-empty"));
        }
        if self.kind == MediaKind::Image {
            let secs = self.image_seconds();
            if !secs.is_finite() || secs <= 0.0 {
                return Err(PlayerError::validation(format!(
                    "image entry '{}' display_seconds must be finite and > 0",
                    self.url
                )));
            }
        }
        Ok(())
    }
}

/// Ordered, immutable sequence of entries. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn new(entries: Vec<PlaylistEntry>) -> PlayerResult<Self> {
        if entries.is_empty() {
            return Err(PlayerError::validation("playlist must contain at least one entry"));
        }
        for entry in &entries {
            entry.validate()?;
        }
        Ok(Self { entries })
    }

    pub fn from_json_str(json: &str) -> PlayerResult<Self> {
        let entries: Vec<PlaylistEntry> =
            serde_json::from_str(json).map_err(|e| PlayerError::serde(e.to_string()))?;
        Self::new(entries)
    }

    pub fn from_json_file(path: &Path) -> PlayerResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read playlist '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Index after `index`, wrapping from the last entry back to 0.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.entries.len()
    }

    /// Index before `index`, wrapping from 0 to the last entry.
    pub fn previous_index(&self, index: usize) -> usize {
        if index == 0 {
            self.entries.len() - 1
        } else {
            (index - 1) % self.entries.len()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playlist/entry.rs"]
mod tests;
