mod registry;
mod service;
mod session;

pub use registry::OverlayRegistry;
pub use service::{OverlayService, StartRequest};
pub use session::{OverlaySessionImpl, WindowSession};

use crate::config::{Config, ConfigRef};
use crate::platform::PlatformRef;
use crate::plugin::{PluginContext, PluginRegistry};
use std::rc::Rc;

/// Everything a session needs from the host process. Cheap to clone.
#[derive(Clone)]
pub struct HostContext {
    pub platform: PlatformRef,
    pub config: ConfigRef,
    pub plugins: Rc<PluginRegistry>,
    pub registry: Rc<OverlayRegistry>,
}

impl HostContext {
    pub fn new(platform: PlatformRef, config: Config) -> Self {
        Self {
            platform,
            config: Rc::new(config),
            plugins: Rc::new(PluginRegistry::new()),
            registry: Rc::new(OverlayRegistry::new()),
        }
    }

    pub fn plugin_context(&self) -> PluginContext {
        PluginContext {
            config: self.config.clone(),
        }
    }
}
