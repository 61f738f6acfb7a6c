use std::{
    cell::{Cell, RefCell},
    mem,
    rc::{Rc, Weak},
};

type Listener<E> = Box<dyn FnMut(&E)>;

struct Slot<E> {
    id: u64,
    listener: Listener<E>,
}

/// Changes requested while the slot list is borrowed by `emit`.
struct Queued<E> {
    added: Vec<Slot<E>>,
    removed: Vec<u64>,
}

impl<E> Default for Queued<E> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

struct HubInner<E> {
    next_id: Cell<u64>,
    slots: RefCell<Vec<Slot<E>>>,
    queued: RefCell<Queued<E>>,
}

impl<E> HubInner<E> {
    fn detach(&self, id: u64) {
        let removed = match self.slots.try_borrow_mut() {
            Ok(mut slots) => slots
                .iter()
                .position(|s| s.id == id)
                .map(|pos| slots.remove(pos)),
            Err(_) => {
                self.queued.borrow_mut().removed.push(id);
                None
            }
        };
        drop(removed);
    }

    fn apply_queued(&self) {
        let Queued { added, removed } = mem::take(&mut *self.queued.borrow_mut());
        if added.is_empty() && removed.is_empty() {
            return;
        }
        let dropped: Vec<Slot<E>> = {
            let mut slots = self.slots.borrow_mut();
            slots.extend(added);
            let (keep, dropped): (Vec<_>, Vec<_>) = mem::take(&mut *slots)
                .into_iter()
                .partition(|s| !removed.contains(&s.id));
            *slots = keep;
            dropped
        };
        // Listeners may own subscriptions to this hub; drop them unborrowed.
        drop(dropped);
    }
}

/// Single-threaded event fan-out with scoped subscriptions.
///
/// Listeners are detached when their [`Subscription`] is dropped, and all of them go away with the
/// hub. A listener may subscribe or drop subscriptions while an event is being delivered; those
/// changes take effect once delivery finishes. Emitting from inside a listener of the same hub is
/// ignored rather than re-entered.
pub struct EventHub<E> {
    inner: Rc<HubInner<E>>,
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(HubInner {
                next_id: Cell::new(0),
                slots: RefCell::new(Vec::new()),
                queued: RefCell::new(Queued::default()),
            }),
        }
    }

    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe(&self, listener: impl FnMut(&E) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let slot = Slot {
            id,
            listener: Box::new(listener),
        };
        match self.inner.slots.try_borrow_mut() {
            Ok(mut slots) => slots.push(slot),
            Err(_) => self.inner.queued.borrow_mut().added.push(slot),
        }
        let weak: Weak<HubInner<E>> = Rc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(hub) = weak.upgrade() {
                    hub.detach(id);
                }
            })),
        }
    }

    pub fn emit(&self, event: &E) {
        {
            let Ok(mut slots) = self.inner.slots.try_borrow_mut() else {
                tracing::debug!("nested emit ignored");
                return;
            };
            for slot in slots.iter_mut() {
                (slot.listener)(event);
            }
        }
        self.inner.apply_queued();
    }

    pub fn listener_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a listener attached for as long as it lives.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/events.rs"]
mod tests;
