use crate::drag::{GestureOutcome, TouchEvent};
use crate::overlay::{HostContext, OverlaySessionImpl, WindowSession};
use crate::platform::{has_overlay_permission, Notification, NotificationAction};
use crate::plugin::DebugViewRef;
use crate::policy::OverlayLauncher;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartRequest {
    /// Elevate the service to foreground mode with a visible notification.
    pub foreground: bool,
}

impl StartRequest {
    pub fn background() -> Self {
        Self { foreground: false }
    }

    pub fn foreground() -> Self {
        Self { foreground: true }
    }
}

/// Binds an overlay session to the host's long-running service lifecycle.
pub struct OverlayService {
    host: HostContext,
    session: RefCell<Option<Box<dyn OverlaySessionImpl>>>,
    running: Cell<bool>,
    showing: Cell<bool>,
    foreground_id: Cell<Option<u32>>,
    in_foreground: Cell<bool>,
}

impl OverlayService {
    pub fn new(host: HostContext) -> Self {
        Self {
            host,
            session: RefCell::new(None),
            running: Cell::new(false),
            showing: Cell::new(false),
            foreground_id: Cell::new(None),
            in_foreground: Cell::new(false),
        }
    }

    /// Starts the service, or delivers another start command if it is already running.
    pub fn start(&self, request: StartRequest) {
        if !self.running.get() {
            if !self.on_create() {
                return;
            }
        } else {
            self.retry_attach();
        }
        self.on_start_command(request);
    }

    /// Tears the session down and leaves foreground mode.
    pub fn stop(&self) {
        if let Some(mut session) = self.session.borrow_mut().take() {
            session.on_destroy();
        }

        if self.in_foreground.replace(false) {
            if let Err(e) = self.host.platform.stop_foreground() {
                warn!("Failed to leave foreground mode: {e}");
            }
        }

        if self.running.replace(false) {
            info!("Overlay service stopped");
        }
        self.showing.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn is_overlay_showing(&self) -> bool {
        self.showing.get()
    }

    pub fn is_foreground(&self) -> bool {
        self.in_foreground.get()
    }

    /// The id used for foreground mode, once one has been assigned.
    pub fn foreground_id(&self) -> Option<u32> {
        self.foreground_id.get()
    }

    pub fn hide(&self) {
        if let Some(session) = self.session.borrow_mut().as_mut() {
            session.hide_plugin();
        }
    }

    pub fn debug_view(&self) -> Option<DebugViewRef> {
        self.session.borrow().as_ref()?.debug_view()
    }

    pub fn dispatch_touch(&self, event: &TouchEvent) -> GestureOutcome {
        match self.session.borrow_mut().as_mut() {
            Some(session) => session.handle_touch(event),
            None => GestureOutcome::Ignored,
        }
    }

    /// Replaces the live session with `next`. The old window is gone before the new one is
    /// registered. A stopped service only keeps `next`; it is attached by the next start once
    /// the permission check passes.
    pub fn switch_session(&self, mut next: Box<dyn OverlaySessionImpl>) {
        let mut session = self.session.borrow_mut();

        if !self.running.get() {
            if let Some(mut current) = session.take() {
                current.on_destroy();
            }
            debug!("Overlay service not running; deferring session attach");
            *session = Some(next);
            return;
        }

        match session.as_mut() {
            Some(current) => current.switch_state(Some(next.as_mut())),
            None => {
                next.attach(&self.host);
                next.load_plugin();
            }
        }

        next.show_plugin();
        self.showing.set(next.is_attached());
        *session = Some(next);
    }

    fn on_create(&self) -> bool {
        if !has_overlay_permission(self.host.platform.as_ref()) {
            // Nothing is attached yet; a deferred session stays detached until a later start
            info!("Overlay permission missing; stopping overlay service");
            self.showing.set(false);
            return false;
        }

        self.running.set(true);
        let mut session = self.session.borrow_mut();
        let session = session.get_or_insert_with(|| Box::new(WindowSession::new()));
        session.attach(&self.host);
        session.load_plugin();
        self.showing.set(session.is_attached());
        debug!("Overlay service created (showing: {})", self.showing.get());
        true
    }

    /// A running service whose window could not be attached gets another try on each start.
    fn retry_attach(&self) {
        if let Some(session) = self.session.borrow_mut().as_mut() {
            if !session.is_attached() {
                session.attach(&self.host);
                session.load_plugin();
                self.showing.set(session.is_attached());
            }
        }
    }

    fn on_start_command(&self, request: StartRequest) {
        if request.foreground {
            self.enter_foreground();
        }
        if let Some(session) = self.session.borrow_mut().as_mut() {
            session.show_plugin();
        }
    }

    fn enter_foreground(&self) {
        let id = match self.foreground_id.get() {
            Some(id) => id,
            None => {
                let id = std::process::id() % 1000 + 1;
                self.foreground_id.set(Some(id));
                id
            }
        };

        let text = &self.host.config.foreground_notification;
        let notification = Notification {
            channel_id: None,
            icon: "ic_menu_info_details",
            title: text.title.clone(),
            text: text.text.clone(),
            auto_cancel: false,
            ongoing: true,
            action: NotificationAction::None,
        };

        match self.host.platform.start_foreground(id, &notification) {
            Ok(()) => self.in_foreground.set(true),
            Err(e) => warn!("Failed to enter foreground mode: {e}"),
        }
    }
}

impl OverlayLauncher for OverlayService {
    fn is_overlay_showing(&self) -> bool {
        OverlayService::is_overlay_showing(self)
    }

    fn start_overlay(&self, request: StartRequest) {
        self.start(request);
    }
}

impl Drop for OverlayService {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::drag::TouchAction;
    use crate::platform::mock::MockPlatform;
    use std::rc::Rc;

    fn service_with(platform: &Rc<MockPlatform>) -> OverlayService {
        OverlayService::new(HostContext::new(platform.clone(), Config::default()))
    }

    #[test]
    fn test_start_without_permission_stops_itself() {
        let platform = Rc::new(MockPlatform::new());
        let service = service_with(&platform);

        service.start(StartRequest::foreground());

        assert!(!service.is_running());
        assert!(!service.is_overlay_showing());
        assert!(service.debug_view().is_none());
        assert_eq!(platform.windows().add_calls(), 0);
        assert_eq!(platform.foreground_starts(), 0);
    }

    #[test]
    fn test_start_with_permission_attaches_and_shows() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);

        service.start(StartRequest::background());

        assert!(service.is_running());
        assert!(service.is_overlay_showing());
        assert!(service.debug_view().unwrap().is_visible());
        assert_eq!(platform.windows().view_count(), 1);
        assert!(!service.is_foreground());
    }

    #[test]
    fn test_legacy_platform_needs_no_permission() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_api_level(22);
        let service = service_with(&platform);

        service.start(StartRequest::background());

        assert!(service.is_overlay_showing());
    }

    #[test]
    fn test_repeated_start_is_reentrant() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);

        service.start(StartRequest::background());
        service.start(StartRequest::background());

        assert_eq!(platform.windows().add_calls(), 1);
        assert_eq!(platform.windows().view_count(), 1);
    }

    #[test]
    fn test_foreground_id_is_assigned_once() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);

        service.start(StartRequest::foreground());
        let first = service.foreground_id().unwrap();
        service.start(StartRequest::foreground());

        assert_eq!(service.foreground_id(), Some(first));
        assert!((1..=1000).contains(&first));
        assert_eq!(platform.foreground_starts(), 2);
        let (id, notification) = platform.foreground().unwrap();
        assert_eq!(id, first);
        assert_eq!(notification.title, "DebugView");
    }

    #[test]
    fn test_stop_tears_down_and_leaves_foreground() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);
        service.start(StartRequest::foreground());

        service.stop();

        assert!(!service.is_running());
        assert!(!service.is_overlay_showing());
        assert!(platform.foreground().is_none());
        assert_eq!(platform.windows().view_count(), 0);

        // Stopping again is harmless
        service.stop();
        assert_eq!(platform.windows().remove_calls(), 1);
    }

    #[test]
    fn test_start_retries_attach_when_window_manager_returns() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        platform.set_window_manager_available(false);
        let service = service_with(&platform);

        service.start(StartRequest::background());
        assert!(service.is_running());
        assert!(!service.is_overlay_showing());

        platform.set_window_manager_available(true);
        service.start(StartRequest::background());
        assert!(service.is_overlay_showing());
        assert_eq!(platform.windows().view_count(), 1);
    }

    #[test]
    fn test_touch_is_routed_to_session() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);
        service.start(StartRequest::background());

        service.dispatch_touch(&TouchEvent::new(TouchAction::Down, 0.0, 0.0));
        let outcome = service.dispatch_touch(&TouchEvent::new(TouchAction::Move, 12.0, 8.0));

        assert!(matches!(outcome, GestureOutcome::Moved(_)));
        let (_, layout) = platform.windows().views().remove(0);
        assert_eq!((layout.x, layout.y), (12, 8));
    }

    #[test]
    fn test_switch_session_keeps_single_window() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);
        service.start(StartRequest::background());
        let old_id = service.debug_view().unwrap().id();

        service.switch_session(Box::new(WindowSession::new()));

        assert_eq!(platform.windows().peak_view_count(), 1);
        let view = service.debug_view().unwrap();
        assert_ne!(view.id(), old_id);
        assert!(view.is_visible());
        assert!(service.is_overlay_showing());
    }

    #[test]
    fn test_switch_session_while_stopped_defers_attach() {
        let platform = Rc::new(MockPlatform::new());
        let service = service_with(&platform);

        service.switch_session(Box::new(WindowSession::new()));

        assert!(!service.is_running());
        assert!(!service.is_overlay_showing());
        assert_eq!(platform.windows().add_calls(), 0);
        assert_eq!(platform.windows().view_count(), 0);

        // Still denied: the deferred session stays detached
        service.start(StartRequest::background());
        assert_eq!(platform.windows().add_calls(), 0);

        platform.set_can_draw_overlays(true);
        service.start(StartRequest::background());
        assert!(service.is_overlay_showing());
        assert_eq!(platform.windows().view_count(), 1);
        assert!(service.debug_view().unwrap().is_visible());
    }

    #[test]
    fn test_switch_session_after_stop_keeps_window_removed() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let service = service_with(&platform);
        service.start(StartRequest::background());
        service.stop();

        service.switch_session(Box::new(WindowSession::new()));

        assert_eq!(platform.windows().add_calls(), 1);
        assert_eq!(platform.windows().remove_calls(), 1);
        assert_eq!(platform.windows().view_count(), 0);
    }

    #[test]
    fn test_drop_stops_service() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        {
            let service = service_with(&platform);
            service.start(StartRequest::background());
            assert_eq!(platform.windows().view_count(), 1);
        }
        assert_eq!(platform.windows().view_count(), 0);
    }
}
