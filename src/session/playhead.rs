use std::time::Duration;

use crate::foundation::core::secs_between;

/// Wall-clock driven position within `[0, duration]`.
///
/// While running, position is `base + (now - anchor)`; stopping folds the elapsed time into
/// `base`. Video sessions use it as their media clock, image sessions as their synthetic timer.
#[derive(Clone, Debug)]
pub(crate) struct Playhead {
    duration: f64,
    base_secs: f64,
    anchor: Option<Duration>,
}

impl Playhead {
    pub(crate) fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            base_secs: 0.0,
            anchor: None,
        }
    }

    pub(crate) fn duration(&self) -> f64 {
        self.duration
    }

    pub(crate) fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub(crate) fn position(&self, now: Duration) -> f64 {
        let running = self
            .anchor
            .map(|anchor| secs_between(anchor, now))
            .unwrap_or(0.0);
        (self.base_secs + running).min(self.duration)
    }

    pub(crate) fn remaining(&self, now: Duration) -> f64 {
        (self.duration - self.position(now)).max(0.0)
    }

    pub(crate) fn at_end(&self, now: Duration) -> bool {
        self.position(now) >= self.duration
    }

    pub(crate) fn start(&mut self, now: Duration) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    pub(crate) fn stop(&mut self, now: Duration) {
        self.base_secs = self.position(now);
        self.anchor = None;
    }

    pub(crate) fn seek(&mut self, secs: f64, now: Duration) {
        let secs = if secs.is_finite() { secs } else { 0.0 };
        self.base_secs = secs.clamp(0.0, self.duration);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/playhead.rs"]
mod tests;
