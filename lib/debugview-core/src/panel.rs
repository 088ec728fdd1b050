use crate::overlay::HostContext;
use crate::plugin::{ContainerKind, DebugView, DebugViewRef};
use log::info;
use std::rc::Rc;

/// Full-screen host for the plugin container, opened from the fallback entry. The panel's view
/// is the current debug view while the panel is open.
pub struct DebugPanel {
    host: HostContext,
    view: DebugViewRef,
}

impl DebugPanel {
    pub fn open(host: &HostContext) -> Self {
        let view = Rc::new(DebugView::new(
            host.registry.allocate_id(),
            ContainerKind::Panel,
        ));
        view.load_plugins(&host.plugin_context(), &host.plugins);
        view.set_visible(true);
        host.registry.attach(&view);
        info!("Opened debug panel {}", view.id());

        Self {
            host: host.clone(),
            view,
        }
    }

    pub fn view(&self) -> &DebugViewRef {
        &self.view
    }
}

impl Drop for DebugPanel {
    fn drop(&mut self) {
        self.view.set_visible(false);
        self.view.unload_plugins();
        self.host.registry.detach(&self.view);
        info!("Closed debug panel {}", self.view.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::overlay::{OverlaySessionImpl, WindowSession};
    use crate::platform::mock::MockPlatform;

    fn host() -> (Rc<MockPlatform>, HostContext) {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let host = HostContext::new(platform.clone(), Config::default());
        (platform, host)
    }

    #[test]
    fn test_panel_is_current_view_while_open() {
        let (platform, host) = host();

        let panel = DebugPanel::open(&host);
        let current = host.registry.get().unwrap();
        assert!(Rc::ptr_eq(&current, panel.view()));
        assert_eq!(current.kind(), ContainerKind::Panel);
        assert!(current.is_visible());
        assert_eq!(platform.windows().add_calls(), 0);

        drop(current);
        drop(panel);
        assert!(host.registry.get().is_none());
    }

    #[test]
    fn test_closing_panel_keeps_newer_overlay() {
        let (_platform, host) = host();
        let panel = DebugPanel::open(&host);

        let mut session = WindowSession::new();
        session.attach(&host);
        let overlay = session.debug_view().unwrap();

        drop(panel);

        let current = host.registry.get().unwrap();
        assert_eq!(current.id(), overlay.id());
        assert_eq!(current.kind(), ContainerKind::Overlay);
    }

    #[test]
    fn test_panel_replaces_overlay_as_current() {
        let (_platform, host) = host();
        let mut session = WindowSession::new();
        session.attach(&host);

        let panel = DebugPanel::open(&host);
        assert_eq!(host.registry.get().unwrap().id(), panel.view().id());

        // The overlay's late teardown must not clear the panel
        session.on_destroy();
        assert_eq!(host.registry.get().unwrap().id(), panel.view().id());
    }
}
