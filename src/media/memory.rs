use std::{
    collections::{HashMap, HashSet},
    task::Poll,
};

use crate::{
    foundation::error::{PlayerError, PlayerResult},
    media::{
        frame::VisualFrame,
        source::{LoadedMedia, MediaLoader, PendingLoad, VideoInfo, VideoSource},
    },
    playlist::entry::PlaylistEntry,
};

/// A generated video: a solid base color whose green channel tracks playback position.
#[derive(Clone, Debug)]
pub struct SyntheticVideo {
    info: VideoInfo,
    base: [u8; 4],
    warmup_requests: u32,
}

impl SyntheticVideo {
    pub fn new(width: u32, height: u32, duration_secs: f64, base: [u8; 4]) -> Self {
        Self {
            info: VideoInfo {
                width,
                height,
                duration_secs,
                fps: 30.0,
            },
            base,
            warmup_requests: 0,
        }
    }

    /// Report "no frame data yet" for the first `requests` frame requests.
    pub fn with_warmup(mut self, requests: u32) -> Self {
        self.warmup_requests = requests;
        self
    }

    /// Color presented at `time_secs`.
    pub fn color_at(&self, time_secs: f64) -> [u8; 4] {
        let pos = (time_secs / self.info.duration_secs).clamp(0.0, 1.0);
        let [r, _, b, a] = self.base;
        [r, (pos * f64::from(a)).round() as u8, b, a]
    }
}

impl VideoSource for SyntheticVideo {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_at(&mut self, time_secs: f64) -> PlayerResult<Option<VisualFrame>> {
        if self.warmup_requests > 0 {
            self.warmup_requests -= 1;
            return Ok(None);
        }
        Ok(Some(VisualFrame::solid(
            self.info.width,
            self.info.height,
            self.color_at(time_secs),
        )))
    }
}

#[derive(Clone, Debug)]
enum MemoryAsset {
    Image(VisualFrame),
    Video(SyntheticVideo),
}

/// Loader over in-memory assets with configurable latency and failures.
///
/// Useful for headless demos and for driving the player deterministically.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    assets: HashMap<String, MemoryAsset>,
    failing: HashSet<String>,
    latency_polls: u32,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: impl Into<String>, frame: VisualFrame) -> Self {
        self.assets.insert(url.into(), MemoryAsset::Image(frame));
        self
    }

    pub fn with_video(mut self, url: impl Into<String>, video: SyntheticVideo) -> Self {
        self.assets.insert(url.into(), MemoryAsset::Video(video));
        self
    }

    /// Make every load for `url` fail as a network/decode error would.
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Number of `Pending` polls each load reports before completing.
    pub fn with_latency_polls(mut self, polls: u32) -> Self {
        self.latency_polls = polls;
        self
    }

    fn resolve(&self, entry: &PlaylistEntry) -> PlayerResult<LoadedMedia> {
        if self.failing.contains(&entry.url) {
            return Err(PlayerError::resource_load(
                entry.url.clone(),
                "network error",
            ));
        }
        match self.assets.get(&entry.url) {
            Some(MemoryAsset::Image(frame)) => Ok(LoadedMedia::Image(frame.clone())),
            Some(MemoryAsset::Video(video)) => Ok(LoadedMedia::Video(Box::new(video.clone()))),
            None => Err(PlayerError::resource_load(entry.url.clone(), "not found")),
        }
    }
}

impl MediaLoader for MemoryLoader {
    fn request(&self, entry: &PlaylistEntry) -> Box<dyn PendingLoad> {
        Box::new(DelayedLoad {
            remaining: self.latency_polls,
            outcome: Some(self.resolve(entry)),
            url: entry.url.clone(),
        })
    }
}

struct DelayedLoad {
    remaining: u32,
    outcome: Option<PlayerResult<LoadedMedia>>,
    url: String,
}

impl PendingLoad for DelayedLoad {
    fn poll_ready(&mut self) -> Poll<PlayerResult<LoadedMedia>> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Poll::Pending;
        }
        match self.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => Poll::Ready(Err(PlayerError::resource_load(
                self.url.clone(),
                "load polled after completion",
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/memory.rs"]
mod tests;
