use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identity of one screen instance in the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenId {
    /// The screen's type name, shared by every instance of that screen.
    pub name: String,
    pub instance: u64,
}

impl ScreenId {
    pub fn new(name: impl Into<String>, instance: u64) -> Self {
        Self {
            name: name.into(),
            instance,
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.instance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

pub trait ScreenLifecycleListener {
    fn on_screen_event(&self, screen: &ScreenId, event: ScreenEvent);
}

/// Notified when the first screen of the application is created and when the last one is
/// destroyed.
pub trait AppVisibilityListener {
    fn on_app_open(&self, first_screen: &ScreenId);

    fn on_app_close(&self, last_screen: &ScreenId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fans screen lifecycle events out to explicitly subscribed listeners.
#[derive(Default)]
pub struct LifecycleHub {
    last_id: Cell<u64>,
    screen_listeners: RefCell<IndexMap<SubscriptionId, Rc<dyn ScreenLifecycleListener>>>,
    app_listeners: RefCell<IndexMap<SubscriptionId, Rc<dyn AppVisibilityListener>>>,
    live_screens: RefCell<IndexSet<ScreenId>>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Rc<dyn ScreenLifecycleListener>) -> SubscriptionId {
        let id = self.next_id();
        self.screen_listeners.borrow_mut().insert(id, listener);
        id
    }

    pub fn subscribe_app(&self, listener: Rc<dyn AppVisibilityListener>) -> SubscriptionId {
        let id = self.next_id();
        self.app_listeners.borrow_mut().insert(id, listener);
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.screen_listeners.borrow_mut().shift_remove(&id).is_some()
            || self.app_listeners.borrow_mut().shift_remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.screen_listeners.borrow().len() + self.app_listeners.borrow().len()
    }

    /// Delivers `event` for `screen`. App open is reported before the first screen's
    /// `Created` reaches screen listeners; app close after the last screen's `Destroyed`.
    /// Listeners may subscribe or unsubscribe while being notified; changes apply to the next
    /// event.
    pub fn dispatch(&self, screen: &ScreenId, event: ScreenEvent) {
        trace!("Screen {screen}: {event:?}");

        if event == ScreenEvent::Created {
            let first = {
                let mut live = self.live_screens.borrow_mut();
                let first = live.is_empty();
                live.insert(screen.clone());
                first
            };
            if first {
                debug!("App opened with {screen}");
                for listener in self.app_snapshot() {
                    listener.on_app_open(screen);
                }
            }
        }

        for listener in self.screen_snapshot() {
            listener.on_screen_event(screen, event);
        }

        if event == ScreenEvent::Destroyed {
            let last = {
                let mut live = self.live_screens.borrow_mut();
                live.shift_remove(screen) && live.is_empty()
            };
            if last {
                debug!("App closed with {screen}");
                for listener in self.app_snapshot() {
                    listener.on_app_close(screen);
                }
            }
        }
    }

    fn next_id(&self) -> SubscriptionId {
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        SubscriptionId(id)
    }

    fn screen_snapshot(&self) -> Vec<Rc<dyn ScreenLifecycleListener>> {
        self.screen_listeners.borrow().values().cloned().collect()
    }

    fn app_snapshot(&self) -> Vec<Rc<dyn AppVisibilityListener>> {
        self.app_listeners.borrow().values().cloned().collect()
    }
}
