pub mod events;
pub mod playback;
pub(crate) mod playhead;
