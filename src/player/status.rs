/// Coarse category of the last status update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Ready,
    Switched,
    Playing,
    Paused,
    /// Playback is waiting for a user gesture.
    Blocked,
    /// A recoverable failure (load, music, render).
    Error,
    /// Running without a feature, e.g. direct mode without a transition renderer.
    Degraded,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Switched => "switched",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Blocked => "blocked",
            Self::Error => "error",
            Self::Degraded => "degraded",
        }
    }
}

/// Human-readable status line.
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Holds the current status and mirrors every update to `tracing`.
#[derive(Debug)]
pub(crate) struct StatusLine {
    current: Status,
}

impl StatusLine {
    pub(crate) fn new() -> Self {
        Self {
            current: Status {
                kind: StatusKind::Loading,
                message: "starting".to_owned(),
            },
        }
    }

    pub(crate) fn set(&mut self, kind: StatusKind, message: impl Into<String>) -> &Status {
        let message = message.into();
        match kind {
            StatusKind::Error | StatusKind::Degraded => {
                tracing::warn!(status = kind.as_str(), "{message}");
            }
            _ => tracing::info!(status = kind.as_str(), "{message}"),
        }
        self.current = Status { kind, message };
        &self.current
    }

    pub(crate) fn current(&self) -> &Status {
        &self.current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/status.rs"]
mod tests;
