/// Convenience result type used across bunnyplay.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Top-level error taxonomy used by player APIs.
///
/// None of these are fatal to a running [`crate::Player`]: the controller catches them at the
/// operation that caused them and turns them into status updates.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// A playlist entry could not be fetched or decoded.
    #[error("failed to load '{url}': {reason}")]
    ResourceLoad {
        /// Url of the entry that failed.
        url: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The platform refused programmatic playback because no user gesture was observed yet.
    #[error("autoplay blocked: playback needs a user gesture")]
    AutoplayBlocked,

    /// The transition renderer's graphics context could not be created.
    #[error("renderer init error: {0}")]
    RendererInit(String),

    /// The background music track could not be loaded.
    #[error("audio load error: {0}")]
    AudioLoad(String),

    /// Invalid user-provided playlist or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlayerError {
    /// Build a [`PlayerError::ResourceLoad`] value.
    pub fn resource_load(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ResourceLoad {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`PlayerError::RendererInit`] value.
    pub fn renderer_init(msg: impl Into<String>) -> Self {
        Self::RendererInit(msg.into())
    }

    /// Build a [`PlayerError::AudioLoad`] value.
    pub fn audio_load(msg: impl Into<String>) -> Self {
        Self::AudioLoad(msg.into())
    }

    /// Build a [`PlayerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlayerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this is the expected "no gesture yet" rejection rather than a real failure.
    pub fn is_autoplay_blocked(&self) -> bool {
        matches!(self, Self::AutoplayBlocked)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
