use std::time::Duration;

use crate::foundation::{core::secs_between, math::unit_clamp};

/// Wall-clock progress ramp of one switch.
///
/// Progress is `elapsed / duration` clamped to `[0, 1]` and never decreases, whatever the tick
/// cadence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionState {
    started_at: Duration,
    duration: Duration,
    progress: f64,
}

impl TransitionState {
    pub fn new(started_at: Duration, duration: Duration) -> Self {
        Self {
            started_at,
            duration,
            progress: 0.0,
        }
    }

    /// Recompute progress for `now`.
    pub fn update(&mut self, now: Duration) -> f64 {
        let total = self.duration.as_secs_f64();
        let p = if total > 0.0 {
            unit_clamp(secs_between(self.started_at, now) / total)
        } else {
            1.0
        };
        self.progress = self.progress.max(p);
        self.progress
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/transition.rs"]
mod tests;
