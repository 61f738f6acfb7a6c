use std::{task::Poll, time::Duration};

use crate::{
    foundation::error::{PlayerError, PlayerResult},
    media::{
        frame::VisualFrame,
        source::{LoadedMedia, MediaLoader, PendingLoad, VideoSource, check_kind},
    },
    playlist::entry::{MediaKind, PlaylistEntry},
    session::{events::EventHub, playhead::Playhead},
};

/// Whether the platform lets programmatic playback start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayPolicy {
    /// Mobile-browser rule: video may only start after a user gesture.
    #[default]
    RequiresGesture,
    /// No restriction.
    Allowed,
}

/// What a session needs to know to decide if `play` may proceed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayGate {
    pub policy: AutoplayPolicy,
    pub user_activated: bool,
}

impl PlayGate {
    pub fn permits(self, kind: MediaKind) -> bool {
        kind == MediaKind::Image || self.policy == AutoplayPolicy::Allowed || self.user_activated
    }
}

/// Notifications a session publishes to its subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Playing,
    Paused,
    Seeked { secs: f64 },
    /// Playback reached the end of the resource (or the image's display time).
    ReachedEnd,
}

/// Uniform playback contract over video and image resources.
pub trait Playback {
    fn kind(&self) -> MediaKind;

    /// Start or resume. Fails with [`PlayerError::AutoplayBlocked`] when the gate refuses, leaving
    /// the session paused but still presentable.
    fn play(&mut self, now: Duration, gate: PlayGate) -> PlayerResult<()>;

    fn pause(&mut self, now: Duration);

    /// Move to `secs` (clamped to `[0, duration]`). A running session keeps counting from there.
    fn seek(&mut self, secs: f64, now: Duration);

    fn current_time(&self, now: Duration) -> f64;

    fn duration(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Advance end-of-stream detection; publishes [`SessionEvent::ReachedEnd`] once per playthrough.
    fn poll(&mut self, now: Duration);

    /// The frame to present at `now`, or `None` while no frame data is decodable yet.
    fn current_frame(&mut self, now: Duration) -> PlayerResult<Option<VisualFrame>>;

    fn events(&self) -> &EventHub<SessionEvent>;
}

/// State shared by both session kinds.
struct Transport {
    playhead: Playhead,
    ended: bool,
    events: EventHub<SessionEvent>,
}

impl Transport {
    fn new(duration: f64) -> Self {
        Self {
            playhead: Playhead::new(duration),
            ended: false,
            events: EventHub::new(),
        }
    }

    fn start(&mut self, now: Duration) {
        if self.playhead.is_running() {
            return;
        }
        if self.ended || self.playhead.at_end(now) {
            self.playhead.seek(0.0, now);
            self.ended = false;
        }
        self.playhead.start(now);
        self.events.emit(&SessionEvent::Playing);
    }

    fn pause(&mut self, now: Duration) {
        if !self.playhead.is_running() {
            return;
        }
        self.playhead.stop(now);
        self.events.emit(&SessionEvent::Paused);
    }

    fn seek(&mut self, secs: f64, now: Duration) {
        self.playhead.seek(secs, now);
        // A running playhead reports the end from `poll`.
        self.ended = !self.playhead.is_running() && self.playhead.at_end(now);
        self.events.emit(&SessionEvent::Seeked {
            secs: self.playhead.position(now),
        });
    }

    fn poll(&mut self, now: Duration) {
        if self.playhead.is_running() && self.playhead.at_end(now) {
            self.playhead.stop(now);
            if !self.ended {
                self.ended = true;
                self.events.emit(&SessionEvent::ReachedEnd);
            }
        }
    }
}

/// A playing video resource.
pub struct VideoSession {
    source: Box<dyn VideoSource>,
    transport: Transport,
    last_key: Option<u64>,
    last_frame: Option<VisualFrame>,
}

impl VideoSession {
    pub fn new(source: Box<dyn VideoSource>) -> Self {
        let duration = source.info().duration_secs;
        Self {
            source,
            transport: Transport::new(duration),
            last_key: None,
            last_frame: None,
        }
    }

    pub fn natural_size(&self) -> (u32, u32) {
        let info = self.source.info();
        (info.width, info.height)
    }
}

impl Playback for VideoSession {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn play(&mut self, now: Duration, gate: PlayGate) -> PlayerResult<()> {
        if !gate.permits(MediaKind::Video) {
            return Err(PlayerError::AutoplayBlocked);
        }
        self.transport.start(now);
        Ok(())
    }

    fn pause(&mut self, now: Duration) {
        self.transport.pause(now);
    }

    fn seek(&mut self, secs: f64, now: Duration) {
        self.transport.seek(secs, now);
    }

    fn current_time(&self, now: Duration) -> f64 {
        self.transport.playhead.position(now)
    }

    fn duration(&self) -> f64 {
        self.transport.playhead.duration()
    }

    fn is_playing(&self) -> bool {
        self.transport.playhead.is_running()
    }

    fn poll(&mut self, now: Duration) {
        self.transport.poll(now);
    }

    fn current_frame(&mut self, now: Duration) -> PlayerResult<Option<VisualFrame>> {
        let t = self.current_time(now);
        let key = self.source.info().frame_key(t);
        if self.last_key == Some(key) && self.last_frame.is_some() {
            return Ok(self.last_frame.clone());
        }
        if let Some(frame) = self.source.frame_at(t)?
            && frame.is_decodable()
        {
            self.last_key = Some(key);
            self.last_frame = Some(frame);
        }
        Ok(self.last_frame.clone())
    }

    fn events(&self) -> &EventHub<SessionEvent> {
        &self.transport.events
    }
}

/// A still image shown for a fixed time, driven by a synthetic timer.
pub struct ImageSession {
    frame: VisualFrame,
    transport: Transport,
}

impl ImageSession {
    pub fn new(frame: VisualFrame, display_seconds: f64) -> Self {
        Self {
            frame,
            transport: Transport::new(display_seconds),
        }
    }

    pub fn natural_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }
}

impl Playback for ImageSession {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn play(&mut self, now: Duration, _gate: PlayGate) -> PlayerResult<()> {
        self.transport.start(now);
        Ok(())
    }

    fn pause(&mut self, now: Duration) {
        self.transport.pause(now);
    }

    fn seek(&mut self, secs: f64, now: Duration) {
        self.transport.seek(secs, now);
    }

    fn current_time(&self, now: Duration) -> f64 {
        self.transport.playhead.position(now)
    }

    fn duration(&self) -> f64 {
        self.transport.playhead.duration()
    }

    fn is_playing(&self) -> bool {
        self.transport.playhead.is_running()
    }

    fn poll(&mut self, now: Duration) {
        self.transport.poll(now);
    }

    fn current_frame(&mut self, _now: Duration) -> PlayerResult<Option<VisualFrame>> {
        Ok(self.frame.is_decodable().then(|| self.frame.clone()))
    }

    fn events(&self) -> &EventHub<SessionEvent> {
        &self.transport.events
    }
}

/// One loaded playlist resource, selected by the entry's kind tag.
pub enum PlaybackSession {
    Video(VideoSession),
    Image(ImageSession),
}

impl PlaybackSession {
    /// Start loading `entry`. Poll the returned [`SessionLoad`] until it resolves.
    pub fn load(entry: &PlaylistEntry, loader: &dyn MediaLoader) -> SessionLoad {
        SessionLoad {
            entry: entry.clone(),
            pending: loader.request(entry),
        }
    }

    /// Wrap an already loaded resource.
    pub fn from_loaded(entry: &PlaylistEntry, media: LoadedMedia) -> PlayerResult<Self> {
        check_kind(entry, &media)?;
        Ok(match media {
            LoadedMedia::Video(source) => Self::Video(VideoSession::new(source)),
            LoadedMedia::Image(frame) => Self::Image(ImageSession::new(frame, entry.image_seconds())),
        })
    }

    pub fn natural_size(&self) -> (u32, u32) {
        match self {
            Self::Video(s) => s.natural_size(),
            Self::Image(s) => s.natural_size(),
        }
    }

    fn inner(&self) -> &dyn Playback {
        match self {
            Self::Video(s) => s,
            Self::Image(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Playback {
        match self {
            Self::Video(s) => s,
            Self::Image(s) => s,
        }
    }
}

impl Playback for PlaybackSession {
    fn kind(&self) -> MediaKind {
        self.inner().kind()
    }

    fn play(&mut self, now: Duration, gate: PlayGate) -> PlayerResult<()> {
        self.inner_mut().play(now, gate)
    }

    fn pause(&mut self, now: Duration) {
        self.inner_mut().pause(now);
    }

    fn seek(&mut self, secs: f64, now: Duration) {
        self.inner_mut().seek(secs, now);
    }

    fn current_time(&self, now: Duration) -> f64 {
        self.inner().current_time(now)
    }

    fn duration(&self) -> f64 {
        self.inner().duration()
    }

    fn is_playing(&self) -> bool {
        self.inner().is_playing()
    }

    fn poll(&mut self, now: Duration) {
        self.inner_mut().poll(now);
    }

    fn current_frame(&mut self, now: Duration) -> PlayerResult<Option<VisualFrame>> {
        self.inner_mut().current_frame(now)
    }

    fn events(&self) -> &EventHub<SessionEvent> {
        self.inner().events()
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("kind", &self.kind())
            .field("duration", &self.duration())
            .field("playing", &self.is_playing())
            .finish()
    }
}

/// An entry being loaded into a session.
pub struct SessionLoad {
    entry: PlaylistEntry,
    pending: Box<dyn PendingLoad>,
}

impl SessionLoad {
    pub fn entry(&self) -> &PlaylistEntry {
        &self.entry
    }

    /// `Ready` once natural dimensions and (for video) duration are known, or on failure.
    pub fn poll(&mut self) -> Poll<PlayerResult<PlaybackSession>> {
        match self.pending.poll_ready() {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(PlayerError::ResourceLoad { url, reason })) => {
                Poll::Ready(Err(PlayerError::ResourceLoad { url, reason }))
            }
            Poll::Ready(Err(other)) => Poll::Ready(Err(PlayerError::resource_load(
                self.entry.url.clone(),
                other,
            ))),
            Poll::Ready(Ok(media)) => Poll::Ready(PlaybackSession::from_loaded(&self.entry, media)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/playback.rs"]
mod tests;
