use std::{cell::Cell, rc::Rc, task::Poll, time::Duration};

use crate::{
    audio::{
        ducking::AudioDucker,
        gain::create_volume_control,
        track::BackgroundTrack,
    },
    foundation::{
        core::{Canvas, Clock},
        error::{PlayerError, PlayerResult},
    },
    media::{frame::VisualFrame, source::MediaLoader},
    player::{
        config::PlayerConfig,
        keys::{Key, PlayerCommand},
        status::{Status, StatusKind, StatusLine},
        ticker::{FlagTicker, FrameTicker},
        transition::TransitionState,
        unlock::{AutoplayUnlock, create_unlock},
    },
    playlist::entry::{MediaKind, Playlist},
    render::{
        fit::{scale_frame, surface_for},
        frame::FrameRGBA,
        renderer::{TextureSlot, TransitionRenderer, create_renderer},
    },
    session::{
        events::{EventHub, Subscription},
        playback::{PlayGate, Playback, PlaybackSession, SessionEvent, SessionLoad},
    },
};

/// Result of a switch request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Loading of the target entry began.
    Started,
    /// The target is already current; nothing happened.
    AlreadyCurrent,
    /// Another switch is loading or transitioning; nothing happened.
    Busy,
}

/// Observable state of the switch state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerPhase {
    Idle,
    Loading { index: usize },
    Transitioning { index: usize, progress: f64 },
}

/// Notifications for hosts.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    StatusChanged(Status),
    Switched { index: usize, kind: MediaKind },
    /// A session was left paused because playback needs a user gesture.
    AutoplayBlocked { index: usize },
    LoadFailed {
        index: usize,
        url: String,
        reason: String,
    },
}

enum Phase {
    Idle,
    Loading {
        index: usize,
        load: SessionLoad,
        autoplay: bool,
    },
    Transitioning {
        index: usize,
        pending: PlaybackSession,
        transition: TransitionState,
    },
}

/// Listeners attached to the current session. Replaced on every swap.
struct CurrentBinding {
    ended: Rc<Cell<bool>>,
    _sub: Subscription,
}

/// Sequential playlist player.
///
/// Headless and host-driven: the host calls [`Player::tick`] on every frame callback (see
/// [`Player::wants_ticks`]) and [`Player::render`] to obtain the composited frame. All state
/// changes happen inside these calls and the control methods, on one thread.
pub struct Player {
    playlist: Playlist,
    loader: Box<dyn MediaLoader>,
    clock: Box<dyn Clock>,
    config: PlayerConfig,
    renderer: Option<Box<dyn TransitionRenderer>>,
    current: Option<PlaybackSession>,
    current_index: usize,
    binding: Option<CurrentBinding>,
    phase: Phase,
    playing: bool,
    gesture_seen: bool,
    blocked: bool,
    early_fired: bool,
    last_direct: Option<VisualFrame>,
    ducker: AudioDucker,
    music: Option<BackgroundTrack>,
    unlock: Box<dyn AutoplayUnlock>,
    ticker: Box<dyn FrameTicker>,
    status: StatusLine,
    events: EventHub<PlayerEvent>,
}

impl Player {
    /// Build a player and start loading the first entry without autoplay.
    ///
    /// A renderer that fails to initialize puts the player in direct mode; a music track that
    /// fails to load leaves it silent. Both are reported through the status line.
    pub fn new(
        playlist: Playlist,
        loader: Box<dyn MediaLoader>,
        clock: Box<dyn Clock>,
        config: PlayerConfig,
    ) -> PlayerResult<Self> {
        config.validate()?;
        let ducker = AudioDucker::new(
            config.ducking.clone(),
            create_volume_control(config.volume_mode, 0.0),
        );
        let unlock = create_unlock(config.unlock);
        let mut player = Self {
            playlist,
            loader,
            clock,
            config,
            renderer: None,
            current: None,
            current_index: 0,
            binding: None,
            phase: Phase::Idle,
            playing: false,
            gesture_seen: false,
            blocked: false,
            early_fired: false,
            last_direct: None,
            ducker,
            music: None,
            unlock,
            ticker: Box::new(FlagTicker::new()),
            status: StatusLine::new(),
            events: EventHub::new(),
        };

        match create_renderer(player.config.renderer, &player.config.render_settings()) {
            Ok(r) => {
                tracing::info!(backend = r.backend_name(), "transition renderer ready");
                player.renderer = Some(r);
            }
            Err(e) => player.set_status(
                StatusKind::Degraded,
                format!("{e}; showing media without transitions"),
            ),
        }

        if let Some(path) = player.config.music.clone() {
            match BackgroundTrack::load(&path) {
                Ok(track) => player.music = Some(track),
                Err(e) => player.set_status(
                    StatusKind::Error,
                    format!("{e}; continuing without music"),
                ),
            }
        }

        player.begin_load(0, false);
        let now = player.clock.now();
        player.reschedule(now);
        Ok(player)
    }

    /// Replace the default [`FlagTicker`].
    pub fn with_ticker(mut self, ticker: Box<dyn FrameTicker>) -> Self {
        self.ticker = ticker;
        let now = self.clock.now();
        self.reschedule(now);
        self
    }

    /// Use an already decoded music track instead of `config.music`.
    pub fn with_music(mut self, track: BackgroundTrack) -> Self {
        self.music = Some(track);
        self
    }

    // ---------------------------------------------------------------------------------------
    // Switching
    // ---------------------------------------------------------------------------------------

    /// Switch to `index`, starting playback of the new item when `autoplay` is set and the
    /// platform allows it.
    #[tracing::instrument(skip(self))]
    pub fn switch_to(&mut self, index: usize, autoplay: bool) -> PlayerResult<SwitchOutcome> {
        if index >= self.playlist.len() {
            return Err(PlayerError::validation(format!(
                "playlist index {index} out of range (len {})",
                self.playlist.len()
            )));
        }
        if !matches!(self.phase, Phase::Idle) {
            tracing::debug!("switch rejected: another switch is in flight");
            return Ok(SwitchOutcome::Busy);
        }
        if index == self.current_index && self.current.is_some() {
            return Ok(SwitchOutcome::AlreadyCurrent);
        }
        self.begin_load(index, autoplay);
        let now = self.clock.now();
        self.reschedule(now);
        Ok(SwitchOutcome::Started)
    }

    /// Switch to the following entry, wrapping. Keeps the current play state.
    pub fn next(&mut self) -> PlayerResult<SwitchOutcome> {
        self.switch_to(self.playlist.next_index(self.current_index), self.playing)
    }

    /// Switch to the preceding entry, wrapping. Keeps the current play state.
    pub fn previous(&mut self) -> PlayerResult<SwitchOutcome> {
        self.switch_to(self.playlist.previous_index(self.current_index), self.playing)
    }

    /// Advance the state machine to the clock's current time.
    ///
    /// Returns the load error when a pending load failed during this tick; the player is back in
    /// `Idle` with the previous item still current.
    pub fn tick(&mut self) -> PlayerResult<()> {
        let now = self.clock.now();
        if let Some(current) = self.current.as_mut() {
            current.poll(now);
        }

        let mut result = Ok(());
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => self.check_advance(now),
            Phase::Loading {
                index,
                mut load,
                autoplay,
            } => match load.poll() {
                Poll::Pending => {
                    self.phase = Phase::Loading {
                        index,
                        load,
                        autoplay,
                    }
                }
                Poll::Ready(Ok(session)) => self.on_loaded(index, session, autoplay, now),
                Poll::Ready(Err(e)) => {
                    self.on_load_failed(index, &e);
                    result = Err(e);
                }
            },
            Phase::Transitioning {
                index,
                mut pending,
                mut transition,
            } => {
                pending.poll(now);
                if transition.is_complete() {
                    self.complete_switch(index, pending, now);
                } else {
                    transition.update(now);
                    self.phase = Phase::Transitioning {
                        index,
                        pending,
                        transition,
                    };
                }
            }
        }

        self.ducker.update(now);
        self.reschedule(now);
        result
    }

    #[tracing::instrument(skip(self))]
    fn begin_load(&mut self, index: usize, autoplay: bool) {
        let Some(entry) = self.playlist.get(index) else {
            return;
        };
        let load = PlaybackSession::load(entry, self.loader.as_ref());
        let message = format!("loading {} ({}/{})", entry.url, index + 1, self.playlist.len());
        self.phase = Phase::Loading {
            index,
            load,
            autoplay,
        };
        self.set_status(StatusKind::Loading, message);
    }

    fn on_loaded(
        &mut self,
        index: usize,
        mut session: PlaybackSession,
        autoplay: bool,
        now: Duration,
    ) {
        let url = self.url_of(index);
        self.set_status(
            StatusKind::Ready,
            format!("ready {url} ({:.1}s {})", session.duration(), session.kind()),
        );
        if autoplay {
            self.start_pending(&mut session, index, now);
        }

        if self.current.is_none() {
            self.install(index, session, now);
            return;
        }
        let mut transition = TransitionState::new(now, self.config.transition_duration());
        transition.update(now);
        self.phase = Phase::Transitioning {
            index,
            pending: session,
            transition,
        };
    }

    fn on_load_failed(&mut self, index: usize, err: &PlayerError) {
        let (url, reason) = match err {
            PlayerError::ResourceLoad { url, reason } => (url.clone(), reason.clone()),
            other => (self.url_of(index), other.to_string()),
        };
        self.events.emit(&PlayerEvent::LoadFailed {
            index,
            url,
            reason,
        });
        self.set_status(
            StatusKind::Error,
            format!("{err}; staying on item {}", self.current_index + 1),
        );
    }

    /// Try to start a freshly loaded session. A refusal leaves it paused and raises the prompt.
    fn start_pending(&mut self, session: &mut PlaybackSession, index: usize, now: Duration) {
        match session.play(now, self.gate()) {
            Ok(()) => self.blocked = false,
            Err(e) if e.is_autoplay_blocked() => self.mark_blocked(index),
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    fn mark_blocked(&mut self, index: usize) {
        self.blocked = true;
        self.events.emit(&PlayerEvent::AutoplayBlocked { index });
        self.set_status(
            StatusKind::Blocked,
            "autoplay blocked; tap play to start playback",
        );
    }

    fn complete_switch(&mut self, index: usize, pending: PlaybackSession, now: Duration) {
        let kind = self.install(index, pending, now);
        self.events.emit(&PlayerEvent::Switched { index, kind });
        self.set_status(
            StatusKind::Switched,
            format!(
                "now showing {} ({}/{})",
                self.url_of(index),
                index + 1,
                self.playlist.len()
            ),
        );
        if self.needs_play_prompt() {
            self.set_status(
                StatusKind::Blocked,
                "playback blocked; tap play to start",
            );
        }
    }

    /// Swap `session` in as current. Ordering: release the old session, promote, re-read timing,
    /// retarget ducking, mirror the unlock helper, then bind listeners.
    fn install(&mut self, index: usize, session: PlaybackSession, now: Duration) -> MediaKind {
        self.binding = None;
        if let Some(mut old) = self.current.take() {
            old.pause(now);
        }

        let kind = session.kind();
        self.current = Some(session);
        self.current_index = index;
        self.early_fired = false;

        // An item shorter than the transition can finish before it becomes current.
        let finished = self
            .current
            .as_ref()
            .is_some_and(|c| c.current_time(now) >= c.duration());
        self.playing = finished || self.current.as_ref().is_some_and(|c| c.is_playing());
        tracing::info!(
            index,
            %kind,
            duration = self.duration(),
            elapsed = self.current_time(),
            playing = self.playing,
            "current item installed"
        );

        self.ducker.set_target_kind(kind, now);
        self.ducker.sync_playback(self.playing);
        self.unlock.on_swap();
        self.unlock.mirror(self.playing);
        self.bind_current(finished);
        kind
    }

    fn bind_current(&mut self, already_ended: bool) {
        let Some(current) = self.current.as_ref() else {
            self.binding = None;
            return;
        };
        let ended = Rc::new(Cell::new(already_ended));
        let flag = ended.clone();
        let sub = current.events().subscribe(move |e: &SessionEvent| {
            if *e == SessionEvent::ReachedEnd {
                flag.set(true);
            }
        });
        self.binding = Some(CurrentBinding { ended, _sub: sub });
    }

    fn check_advance(&mut self, now: Duration) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let ended = self.binding.as_ref().is_some_and(|b| b.ended.replace(false));
        if ended {
            tracing::info!(index = self.current_index, "reached end");
            self.auto_advance(now);
            return;
        }
        if let Some(lead) = self.config.advance.lead_secs()
            && !self.early_fired
            && current.is_playing()
            && current.duration() - current.current_time(now) <= lead
        {
            self.early_fired = true;
            tracing::info!(index = self.current_index, lead, "early advance");
            self.auto_advance(now);
        }
    }

    fn auto_advance(&mut self, now: Duration) {
        let next = self.playlist.next_index(self.current_index);
        if next == self.current_index {
            // Single-entry playlist loops in place.
            let gate = self.gate();
            if let Some(current) = self.current.as_mut() {
                current.seek(0.0, now);
                if current.play(now, gate).is_err() {
                    self.playing = false;
                }
            }
            self.early_fired = false;
            return;
        }
        self.begin_load(next, true);
    }

    // ---------------------------------------------------------------------------------------
    // Controls
    // ---------------------------------------------------------------------------------------

    /// Start or resume the current item. An in-flight switch follows the new play state.
    ///
    /// [`PlayerError::AutoplayBlocked`] is returned as a value and leaves the item paused with
    /// [`Player::needs_play_prompt`] set. Call [`Player::user_gesture`] first when the request
    /// comes from user input.
    pub fn play(&mut self) -> PlayerResult<()> {
        let now = self.clock.now();
        let gate = self.gate();
        let Some(current) = self.current.as_mut() else {
            return Err(PlayerError::validation("nothing loaded yet"));
        };
        if let Err(e) = current.play(now, gate) {
            if e.is_autoplay_blocked() {
                self.playing = false;
                self.mark_blocked(self.current_index);
            }
            return Err(e);
        }
        let pending_blocked = match &mut self.phase {
            Phase::Loading { autoplay, .. } => {
                *autoplay = true;
                None
            }
            Phase::Transitioning { index, pending, .. } => {
                pending.play(now, gate).is_err().then_some(*index)
            }
            Phase::Idle => None,
        };
        self.playing = true;
        self.blocked = false;
        self.ducker.sync_playback(true);
        self.unlock.mirror(true);
        self.set_status(
            StatusKind::Playing,
            format!("playing {}", self.url_of(self.current_index)),
        );
        if let Some(index) = pending_blocked {
            self.mark_blocked(index);
        }
        self.reschedule(now);
        Ok(())
    }

    pub fn pause(&mut self) {
        let now = self.clock.now();
        if let Some(current) = self.current.as_mut() {
            current.pause(now);
        }
        match &mut self.phase {
            Phase::Loading { autoplay, .. } => *autoplay = false,
            Phase::Transitioning { pending, .. } => pending.pause(now),
            Phase::Idle => {}
        }
        if self.playing {
            self.set_status(
                StatusKind::Paused,
                format!("paused {}", self.url_of(self.current_index)),
            );
        }
        self.playing = false;
        self.ducker.sync_playback(false);
        self.unlock.mirror(false);
        self.reschedule(now);
    }

    pub fn toggle_play(&mut self) -> PlayerResult<()> {
        if self.playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Seek the current item to `secs`, clamped to its duration.
    pub fn seek(&mut self, secs: f64) {
        let now = self.clock.now();
        if let Some(current) = self.current.as_mut() {
            current.seek(secs, now);
        }
    }

    /// Seek to `percent` (0-100) of the current item's duration.
    pub fn seek_percent(&mut self, percent: f64) {
        let fraction = if percent.is_nan() {
            0.0
        } else {
            (percent / 100.0).clamp(0.0, 1.0)
        };
        self.seek(self.duration() * fraction);
    }

    pub fn seek_by(&mut self, delta_secs: f64) {
        self.seek(self.current_time() + delta_secs);
    }

    /// Returns the new mute state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.ducker.toggle_mute();
        tracing::info!(muted, "mute toggled");
        muted
    }

    /// Record a user gesture. The first one unlocks autoplay for the rest of the session.
    pub fn user_gesture(&mut self) {
        if !self.gesture_seen {
            self.gesture_seen = true;
            tracing::info!(strategy = ?self.unlock.strategy(), "first user gesture");
        }
        self.unlock.on_user_gesture();
        self.unlock.mirror(self.playing);
    }

    pub fn execute(&mut self, command: PlayerCommand) -> PlayerResult<()> {
        match command {
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::SeekBy(delta) => {
                self.seek_by(delta);
                Ok(())
            }
            PlayerCommand::Previous => self.previous().map(|_| ()),
            PlayerCommand::Next => self.next().map(|_| ()),
        }
    }

    /// Keyboard input. Key presses count as user gestures.
    pub fn handle_key(&mut self, key: Key) -> PlayerResult<()> {
        self.user_gesture();
        self.execute(PlayerCommand::for_key(key, self.config.seek_step_secs))
    }

    // ---------------------------------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------------------------------

    /// Composite the frame to show in `viewport`.
    ///
    /// The output keeps the current item's aspect ratio, is bounded by the viewport and the
    /// configured maximum, and is never larger than the item's natural size.
    pub fn render(&mut self, viewport: Canvas) -> PlayerResult<FrameRGBA> {
        let now = self.clock.now();
        let max = Canvas {
            width: self.config.max_width,
            height: self.config.max_height,
        };
        let Some(current) = self.current.as_mut() else {
            let blank = surface_for((viewport.width, viewport.height), viewport, max);
            return Ok(FrameRGBA::filled(blank, [0, 0, 0, 255]));
        };
        let canvas = surface_for(current.natural_size(), viewport, max);
        let from = current.current_frame(now)?;

        let (progress, to) = match &mut self.phase {
            Phase::Transitioning {
                pending,
                transition,
                ..
            } => (transition.progress(), pending.current_frame(now)?),
            _ => (0.0, from.clone()),
        };

        if let Some(renderer) = self.renderer.as_mut() {
            if let Some(frame) = &from {
                renderer.set_source(TextureSlot::From, frame);
            }
            if let Some(frame) = &to {
                renderer.set_source(TextureSlot::To, frame);
            }
            return renderer.render_frame(progress as f32, canvas);
        }

        if let Some(frame) = from {
            self.last_direct = Some(frame);
        }
        Ok(match &self.last_direct {
            Some(frame) => scale_frame(frame, canvas),
            None => FrameRGBA::filled(canvas, [0, 0, 0, 255]),
        })
    }

    /// Fill `out` with the next background music samples, interleaved with
    /// [`Player::music_channels`] channels. Silence while paused or without music.
    pub fn render_audio(&mut self, out: &mut [f32]) {
        match self.music.as_mut() {
            Some(track) if self.ducker.is_playing() => {
                track.render_into(out, self.ducker.control_mut())
            }
            _ => out.fill(0.0),
        }
    }

    pub fn music_channels(&self) -> Option<u16> {
        self.music.as_ref().map(|t| t.channels())
    }

    // ---------------------------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------------------------

    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl FnMut(&PlayerEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn status(&self) -> &Status {
        self.status.current()
    }

    pub fn phase(&self) -> PlayerPhase {
        match &self.phase {
            Phase::Idle => PlayerPhase::Idle,
            Phase::Loading { index, .. } => PlayerPhase::Loading { index: *index },
            Phase::Transitioning {
                index, transition, ..
            } => PlayerPhase::Transitioning {
                index: *index,
                progress: transition.progress(),
            },
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_kind(&self) -> Option<MediaKind> {
        self.current.as_ref().map(|c| c.kind())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    /// Transition progress, 0 when no transition runs.
    pub fn progress(&self) -> f64 {
        match &self.phase {
            Phase::Transitioning { transition, .. } => transition.progress(),
            _ => 0.0,
        }
    }

    /// Whether the host should show a play affordance because autoplay was refused.
    pub fn needs_play_prompt(&self) -> bool {
        self.blocked && !self.playing
    }

    pub fn current_time(&self) -> f64 {
        let now = self.clock.now();
        self.current.as_ref().map_or(0.0, |c| c.current_time(now))
    }

    pub fn duration(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |c| c.duration())
    }

    /// Music level currently applied (0 while muted).
    pub fn audio_volume(&self) -> f32 {
        self.ducker.output_volume()
    }

    pub fn ducker(&self) -> &AudioDucker {
        &self.ducker
    }

    pub fn unlock(&self) -> &dyn AutoplayUnlock {
        self.unlock.as_ref()
    }

    /// Backend name, or `None` in direct mode.
    pub fn renderer_backend(&self) -> Option<&'static str> {
        self.renderer.as_ref().map(|r| r.backend_name())
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Whether anything is animating: playback, a load, a transition or a volume ramp.
    pub fn wants_ticks(&self) -> bool {
        self.ticker.is_active()
    }

    fn gate(&self) -> PlayGate {
        PlayGate {
            policy: self.config.autoplay,
            user_activated: self.gesture_seen,
        }
    }

    fn url_of(&self, index: usize) -> String {
        self.playlist
            .get(index)
            .map(|e| e.url.clone())
            .unwrap_or_default()
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        let status = self.status.set(kind, message).clone();
        self.events.emit(&PlayerEvent::StatusChanged(status));
    }

    fn reschedule(&mut self, now: Duration) {
        let wants = self.playing
            || !matches!(self.phase, Phase::Idle)
            || self.ducker.is_ramping(now);
        if wants && !self.ticker.is_active() {
            self.ticker.request();
        } else if !wants && self.ticker.is_active() {
            self.ticker.cancel();
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("phase", &self.phase())
            .field("current_index", &self.current_index)
            .field("playing", &self.playing)
            .field("status", self.status())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/controller.rs"]
mod tests;
