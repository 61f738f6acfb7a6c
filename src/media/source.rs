use std::{sync::mpsc, task::Poll};

use crate::{
    foundation::error::{PlayerError, PlayerResult},
    media::frame::VisualFrame,
    playlist::entry::{MediaKind, PlaylistEntry},
};

/// Metadata known once a video resource is ready to play.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Decoded stream duration.
    pub duration_secs: f64,
    /// Nominal frame rate, used to bucket frame requests.
    pub fps: f64,
}

impl VideoInfo {
    /// Check the fields a session relies on before it can expose the resource.
    pub fn validate(&self) -> PlayerResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PlayerError::validation("video has zero natural dimensions"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(PlayerError::validation(
                "video duration must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub(crate) fn frame_key(&self, time_secs: f64) -> u64 {
        let fps = if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            30.0
        };
        (time_secs.clamp(0.0, self.duration_secs) * fps).floor() as u64
    }
}

/// A decoded, seekable video stream.
pub trait VideoSource: Send {
    /// Stream metadata.
    fn info(&self) -> &VideoInfo;

    /// Frame presented at `time_secs`.
    ///
    /// `Ok(None)` means no frame data is available yet; callers keep showing what they had.
    fn frame_at(&mut self, time_secs: f64) -> PlayerResult<Option<VisualFrame>>;
}

/// A fully loaded playlist resource.
pub enum LoadedMedia {
    /// A video stream.
    Video(Box<dyn VideoSource>),
    /// A decoded still image.
    Image(VisualFrame),
}

impl LoadedMedia {
    /// Kind of the loaded resource.
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Video(_) => MediaKind::Video,
            Self::Image(_) => MediaKind::Image,
        }
    }
}

impl std::fmt::Debug for LoadedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video(v) => f.debug_tuple("Video").field(v.info()).finish(),
            Self::Image(img) => f
                .debug_struct("Image")
                .field("width", &img.width)
                .field("height", &img.height)
                .finish(),
        }
    }
}

/// An in-flight resource load. Completion is observed by polling from the player's tick.
pub trait PendingLoad {
    /// `Poll::Ready` exactly once with the load outcome.
    fn poll_ready(&mut self) -> Poll<PlayerResult<LoadedMedia>>;
}

/// Source of playlist resources.
pub trait MediaLoader {
    /// Start loading `entry`. Errors surface through the returned [`PendingLoad`].
    fn request(&self, entry: &PlaylistEntry) -> Box<dyn PendingLoad>;
}

/// A load whose outcome is already known.
pub struct ReadyLoad {
    url: String,
    outcome: Option<PlayerResult<LoadedMedia>>,
}

impl ReadyLoad {
    pub fn new(url: impl Into<String>, outcome: PlayerResult<LoadedMedia>) -> Self {
        Self {
            url: url.into(),
            outcome: Some(outcome),
        }
    }
}

impl PendingLoad for ReadyLoad {
    fn poll_ready(&mut self) -> Poll<PlayerResult<LoadedMedia>> {
        match self.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => Poll::Ready(Err(PlayerError::resource_load(
                self.url.clone(),
                "load polled after completion",
            ))),
        }
    }
}

/// A load running on a worker thread, reporting back over a channel.
pub struct ThreadedLoad {
    url: String,
    rx: mpsc::Receiver<PlayerResult<LoadedMedia>>,
    done: bool,
}

impl ThreadedLoad {
    /// Run `job` on a new thread.
    pub fn spawn<F>(url: impl Into<String>, job: F) -> Self
    where
        F: FnOnce() -> PlayerResult<LoadedMedia> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let _ = tx.send(job());
        });
        Self {
            url: url.into(),
            rx,
            done: false,
        }
    }
}

impl PendingLoad for ThreadedLoad {
    fn poll_ready(&mut self) -> Poll<PlayerResult<LoadedMedia>> {
        if self.done {
            return Poll::Ready(Err(PlayerError::resource_load(
                self.url.clone(),
                "load polled after completion",
            )));
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.done = true;
                Poll::Ready(outcome)
            }
            Err(mpsc::TryRecvError::Empty) => Poll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.done = true;
                Poll::Ready(Err(PlayerError::resource_load(
                    self.url.clone(),
                    "loader thread exited without a result",
                )))
            }
        }
    }
}

/// Check that the loader produced what the playlist entry declared.
pub(crate) fn check_kind(entry: &PlaylistEntry, media: &LoadedMedia) -> PlayerResult<()> {
    if media.kind() != entry.kind {
        return Err(PlayerError::resource_load(
            entry.url.clone(),
            format!(
                "expected {} resource, loader produced {}",
                entry.kind,
                media.kind()
            ),
        ));
    }
    match media {
        LoadedMedia::Video(v) => v
            .info()
            .validate()
            .map_err(|e| PlayerError::resource_load(entry.url.clone(), e)),
        LoadedMedia::Image(img) if !img.is_decodable() => Err(PlayerError::resource_load(
            entry.url.clone(),
            "image has zero natural dimensions",
        )),
        LoadedMedia::Image(_) => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
