//! bunnyplay is a headless sequential media player engine.
//!
//! It plays a fixed playlist of videos and still images in order, blends between items with a
//! zoom transition, ducks a looping music bed by content kind, and models the "needs a user
//! gesture" autoplay restriction of mobile browsers.
//!
//! The host drives everything:
//!
//! - Build a [`Playlist`] and a [`PlayerConfig`]
//! - Create a [`Player`] with a [`MediaLoader`] and a [`Clock`]
//! - Call [`Player::tick`] on frame callbacks and [`Player::render`] to get a [`FrameRGBA`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod audio;
pub mod foundation;
pub mod media;
pub mod player;
pub mod playlist;
pub mod render;
pub mod session;

pub use crate::animation::ease::Ease;
pub use crate::audio::{
    ducking::{AudioDucker, DuckingConfig},
    gain::{ElementVolume, GainNode, VolumeControl, VolumeMode},
    track::BackgroundTrack,
};
pub use crate::foundation::core::{Canvas, Clock, ManualClock, SystemClock};
pub use crate::foundation::error::{PlayerError, PlayerResult};
pub use crate::media::{
    decode::decode_image,
    ffmpeg::{AudioPcm, FfmpegVideo, MIX_SAMPLE_RATE, ffmpeg_tools_available},
    frame::VisualFrame,
    fs::FsLoader,
    memory::{MemoryLoader, SyntheticVideo},
    source::{LoadedMedia, MediaLoader, PendingLoad, ReadyLoad, ThreadedLoad, VideoInfo, VideoSource},
};
pub use crate::player::{
    config::{AdvanceTrigger, PlayerConfig},
    controller::{Player, PlayerEvent, PlayerPhase, SwitchOutcome},
    keys::{Key, PlayerCommand},
    status::{Status, StatusKind},
    ticker::{FlagTicker, FrameTicker},
    transition::TransitionState,
    unlock::{
        AutoplayUnlock, HelperVideoUnlock, NoopUnlock, PersistentElementUnlock, UnlockStrategy,
    },
};
pub use crate::playlist::entry::{DEFAULT_IMAGE_SECONDS, MediaKind, Playlist, PlaylistEntry};
pub use crate::render::{
    cpu::CpuZoomRenderer,
    fit::{fit_within, scale_frame, surface_for},
    frame::FrameRGBA,
    renderer::{
        RenderSettings, RendererKind, TextureSlot, TransitionRenderer, ZoomUniforms,
        create_renderer,
    },
};
#[cfg(feature = "gpu")]
pub use crate::render::gpu::GpuZoomRenderer;
pub use crate::session::{
    events::{EventHub, Subscription},
    playback::{
        AutoplayPolicy, ImageSession, PlayGate, Playback, PlaybackSession, SessionEvent,
        SessionLoad, VideoSession,
    },
};
