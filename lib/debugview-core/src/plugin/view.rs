use crate::drag::{DragGestureTracker, GestureOutcome, TouchEvent};
use crate::platform::{OverlayId, Size};
use crate::plugin::{ContainerKind, DebugPlugin, PluginContainer, PluginContext, PluginRegistry};
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type DebugViewRef = Rc<DebugView>;

/// The container that hosts the loaded debug plugins. One instance backs the overlay window;
/// the fallback panel creates its own.
pub struct DebugView {
    id: OverlayId,
    kind: ContainerKind,
    visible: Cell<bool>,
    rendered_size: Cell<Size>,
    gesture: RefCell<DragGestureTracker>,
    plugins: RefCell<Vec<Box<dyn DebugPlugin>>>,
    loaded: Cell<bool>,
}

impl DebugView {
    pub fn new(id: OverlayId, kind: ContainerKind) -> Self {
        Self {
            id,
            kind,
            visible: Cell::new(false),
            rendered_size: Cell::new(Size::default()),
            gesture: RefCell::new(DragGestureTracker::new()),
            plugins: RefCell::new(Vec::new()),
            loaded: Cell::new(false),
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Size the view was last laid out at; empty before the first layout pass.
    pub fn rendered_size(&self) -> Size {
        self.rendered_size.get()
    }

    /// Called by the host after each layout pass.
    pub fn on_layout(&self, size: Size) {
        self.rendered_size.set(size);
    }

    /// Instantiates every registered plugin and loads it into this container. Loading an
    /// already loaded view does nothing.
    pub fn load_plugins(&self, ctx: &PluginContext, registry: &PluginRegistry) {
        if self.loaded.get() {
            return;
        }

        let container = PluginContainer {
            id: self.id,
            kind: self.kind,
        };
        let mut plugins = registry.instantiate_all();
        for plugin in plugins.iter_mut() {
            trace!("Loading plugin {} into view {}", plugin.id(), self.id);
            plugin.on_load(ctx, &container);
            if self.visible.get() {
                plugin.on_show();
            }
        }

        debug!("View {} loaded {} plugins", self.id, plugins.len());
        *self.plugins.borrow_mut() = plugins;
        self.loaded.set(true);
    }

    /// Changes visibility and tells the plugins when it actually changed.
    pub fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) == visible {
            return;
        }

        for plugin in self.plugins.borrow_mut().iter_mut() {
            if visible {
                plugin.on_show();
            } else {
                plugin.on_hide();
            }
        }
    }

    pub fn unload_plugins(&self) {
        let plugins = std::mem::take(&mut *self.plugins.borrow_mut());
        for mut plugin in plugins {
            trace!("Unloading plugin {} from view {}", plugin.id(), self.id);
            plugin.on_unload();
        }
        self.loaded.set(false);
    }

    pub fn plugin_ids(&self) -> Vec<String> {
        self.plugins
            .borrow()
            .iter()
            .map(|p| p.id().to_string())
            .collect()
    }

    /// Runs `f` against the first loaded plugin of type `T`.
    pub fn with_plugin<T: DebugPlugin, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut plugins = self.plugins.borrow_mut();
        let plugin = plugins
            .iter_mut()
            .find_map(|plugin| plugin.as_any_mut().downcast_mut::<T>())?;
        Some(f(plugin))
    }

    /// Feeds a raw touch sample to the drag gesture tracker.
    pub fn on_touch(&self, event: &TouchEvent) -> GestureOutcome {
        self.gesture.borrow_mut().handle_event(event)
    }
}
