use std::{cell::Cell, rc::Rc};

/// Host frame-callback scheduling, in the spirit of `requestAnimationFrame`.
///
/// The player requests ticks only while something is animating and cancels them as soon as
/// nothing is, so a host never keeps a callback alive for an idle player.
pub trait FrameTicker {
    fn request(&mut self);
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
}

/// Ticker that records the requested state in shared cells. Clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct FlagTicker {
    active: Rc<Cell<bool>>,
    requests: Rc<Cell<u64>>,
    cancels: Rc<Cell<u64>>,
}

impl FlagTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.get()
    }

    pub fn cancels(&self) -> u64 {
        self.cancels.get()
    }
}

impl FrameTicker for FlagTicker {
    fn request(&mut self) {
        if !self.active.get() {
            self.active.set(true);
            self.requests.set(self.requests.get() + 1);
        }
    }

    fn cancel(&mut self) {
        if self.active.get() {
            self.active.set(false);
            self.cancels.set(self.cancels.get() + 1);
        }
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/ticker.rs"]
mod tests;
