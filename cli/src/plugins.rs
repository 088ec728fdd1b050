use debugview_core::plugin::{
    DebugPlugin, PluginCatalog, PluginContainer, PluginContext, PluginDescriptor,
};
use log::info;
use std::any::Any;

/// Collects log lines while the container is shown.
#[derive(Default)]
pub struct LogViewPlugin {
    lines: Vec<String>,
    visible: bool,
}

impl LogViewPlugin {
    pub fn append(&mut self, line: impl Into<String>) {
        if self.visible {
            self.lines.push(line.into());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl DebugPlugin for LogViewPlugin {
    fn id(&self) -> &str {
        "log_view"
    }

    fn on_load(&mut self, _ctx: &PluginContext, container: &PluginContainer) {
        self.lines.push(format!("attached to {:?} {}", container.kind, container.id));
    }

    fn on_show(&mut self) {
        self.visible = true;
    }

    fn on_hide(&mut self) {
        self.visible = false;
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Reports the overlay window geometry it was configured with.
#[derive(Default)]
pub struct DeviceInfoPlugin;

impl DebugPlugin for DeviceInfoPlugin {
    fn id(&self) -> &str {
        "device_info"
    }

    fn on_load(&mut self, ctx: &PluginContext, container: &PluginContainer) {
        info!(
            "Device info in {:?}: overlay window {}x{}",
            container.kind, ctx.config.window_width, ctx.config.window_height
        );
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn log_view() -> Result<Box<dyn DebugPlugin>, String> {
    Ok(Box::new(LogViewPlugin::default()))
}

fn device_info() -> Result<Box<dyn DebugPlugin>, String> {
    Ok(Box::new(DeviceInfoPlugin))
}

/// The plugins this binary is built with.
pub fn catalog() -> PluginCatalog {
    PluginCatalog::new(vec![
        PluginDescriptor::new("log_view", log_view),
        PluginDescriptor::new("device_info", device_info),
    ])
}
