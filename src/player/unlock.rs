/// Which workaround keeps programmatic playback permitted across media swaps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStrategy {
    /// A separate silent, muted, looping helper video that mirrors the play state.
    #[default]
    HelperVideo,
    /// One media element reused across swaps so its permission carries over.
    PersistentElement,
    /// Platforms without an autoplay restriction.
    Disabled,
}

/// Keeps the platform's autoplay permission warm once a user gesture has been seen.
pub trait AutoplayUnlock {
    fn strategy(&self) -> UnlockStrategy;

    /// Set once on the first gesture and never cleared.
    fn has_unlocked(&self) -> bool;

    fn on_user_gesture(&mut self);

    /// Follow the controller's play state. Ignored until unlocked.
    fn mirror(&mut self, is_playing: bool);

    /// Called after every completed media swap.
    fn on_swap(&mut self) {}

    /// Whether the helper element itself is currently playing.
    fn is_helper_playing(&self) -> bool;
}

/// Silent looping muted video, started on first gesture and mirrored afterwards.
#[derive(Clone, Debug, Default)]
pub struct HelperVideoUnlock {
    unlocked: bool,
    playing: bool,
}

impl AutoplayUnlock for HelperVideoUnlock {
    fn strategy(&self) -> UnlockStrategy {
        UnlockStrategy::HelperVideo
    }

    fn has_unlocked(&self) -> bool {
        self.unlocked
    }

    fn on_user_gesture(&mut self) {
        if !self.unlocked {
            self.unlocked = true;
            self.playing = true;
            tracing::info!("autoplay unlocked via helper video");
        }
    }

    fn mirror(&mut self, is_playing: bool) {
        if self.unlocked {
            self.playing = is_playing;
        }
    }

    fn is_helper_playing(&self) -> bool {
        self.playing
    }
}

/// Reuses one element for every item; swaps only change its source.
#[derive(Clone, Debug, Default)]
pub struct PersistentElementUnlock {
    unlocked: bool,
    playing: bool,
    reuses: u64,
}

impl PersistentElementUnlock {
    /// Number of swaps the element has been carried across.
    pub fn reuses(&self) -> u64 {
        self.reuses
    }
}

impl AutoplayUnlock for PersistentElementUnlock {
    fn strategy(&self) -> UnlockStrategy {
        UnlockStrategy::PersistentElement
    }

    fn has_unlocked(&self) -> bool {
        self.unlocked
    }

    fn on_user_gesture(&mut self) {
        if !self.unlocked {
            self.unlocked = true;
            tracing::info!("autoplay unlocked on persistent element");
        }
    }

    fn mirror(&mut self, is_playing: bool) {
        if self.unlocked {
            self.playing = is_playing;
        }
    }

    fn on_swap(&mut self) {
        self.reuses += 1;
    }

    fn is_helper_playing(&self) -> bool {
        self.playing
    }
}

/// Does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUnlock;

impl AutoplayUnlock for NoopUnlock {
    fn strategy(&self) -> UnlockStrategy {
        UnlockStrategy::Disabled
    }

    fn has_unlocked(&self) -> bool {
        false
    }

    fn on_user_gesture(&mut self) {}

    fn mirror(&mut self, _is_playing: bool) {}

    fn is_helper_playing(&self) -> bool {
        false
    }
}

pub fn create_unlock(strategy: UnlockStrategy) -> Box<dyn AutoplayUnlock> {
    match strategy {
        UnlockStrategy::HelperVideo => Box::new(HelperVideoUnlock::default()),
        UnlockStrategy::PersistentElement => Box::new(PersistentElementUnlock::default()),
        UnlockStrategy::Disabled => Box::new(NoopUnlock),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/unlock.rs"]
mod tests;
