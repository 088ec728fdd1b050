mod registry;
mod view;

pub use registry::{PluginCatalog, PluginDescriptor, PluginFactory, PluginRegistry};
pub use view::{DebugView, DebugViewRef};

use crate::config::ConfigRef;
use crate::platform::OverlayId;
use std::any::Any;

/// Where a plugin container is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// The floating system overlay window.
    Overlay,
    /// The full-screen fallback panel.
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginContainer {
    pub id: OverlayId,
    pub kind: ContainerKind,
}

pub struct PluginContext {
    pub config: ConfigRef,
}

/// A debug panel hosted by a [`DebugView`]. Callbacks run on the UI thread and must not call
/// back into the view that hosts them.
pub trait DebugPlugin: Any {
    fn id(&self) -> &str;

    fn on_load(&mut self, ctx: &PluginContext, container: &PluginContainer);

    fn on_show(&mut self) {}

    fn on_hide(&mut self) {}

    fn on_unload(&mut self) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
