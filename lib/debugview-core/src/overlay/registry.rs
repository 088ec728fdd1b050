use crate::platform::OverlayId;
use crate::plugin::{DebugView, DebugViewRef};
use log::trace;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct TrackedView {
    id: OverlayId,
    view: Weak<DebugView>,
}

/// Non-owning lookup of the live debug view. The registry never keeps a view alive: once its
/// owner drops it, [`OverlayRegistry::get`] reports `None`.
#[derive(Default)]
pub struct OverlayRegistry {
    current: RefCell<Option<TrackedView>>,
    last_id: Cell<OverlayId>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next view generation. Ids start at 1 and are never reused.
    pub fn allocate_id(&self) -> OverlayId {
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        id
    }

    /// Tracks `view`, replacing whatever was tracked before.
    pub fn attach(&self, view: &DebugViewRef) {
        trace!("Tracking debug view {}", view.id());
        *self.current.borrow_mut() = Some(TrackedView {
            id: view.id(),
            view: Rc::downgrade(view),
        });
    }

    /// Stops tracking `view`. Does nothing if a different view has been attached since, so a
    /// late detach cannot clobber a newer attachment. Returns whether anything was cleared.
    pub fn detach(&self, view: &DebugView) -> bool {
        let mut current = self.current.borrow_mut();
        match current.as_ref() {
            Some(tracked) if tracked.id == view.id() => {
                trace!("Untracking debug view {}", view.id());
                *current = None;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self) -> Option<DebugViewRef> {
        let mut current = self.current.borrow_mut();
        let view = current.as_ref()?.view.upgrade();
        if view.is_none() {
            // The owner released the view without detaching it
            *current = None;
        }
        view
    }
}
