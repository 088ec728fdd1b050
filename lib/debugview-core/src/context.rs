use crate::config::{Config, ConfigRef};
use crate::drag::{GestureOutcome, TouchEvent};
use crate::error::{DebugViewError, DebugViewResult};
use crate::lifecycle::{AppVisibilityListener, LifecycleHub, ScreenEvent, ScreenId, SubscriptionId};
use crate::overlay::{HostContext, OverlayService, StartRequest};
use crate::panel::DebugPanel;
use crate::platform::{NotificationAction, PlatformRef};
use crate::plugin::{DebugPlugin, DebugViewRef, PluginCatalog, PluginRegistry};
use crate::policy::{DisplayPolicyCoordinator, FallbackEntry, OptInScreens};
use log::{debug, info, trace};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

static CONTEXT_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Registers the configured optional plugins when the application opens.
struct PluginRegistration {
    catalog: PluginCatalog,
    registry: Rc<PluginRegistry>,
    ids: Vec<String>,
}

impl AppVisibilityListener for PluginRegistration {
    fn on_app_open(&self, first_screen: &ScreenId) {
        trace!("Registering optional plugins for {first_screen}");
        let missing = self.catalog.register_optional(&self.registry, &self.ids);
        if !missing.is_empty() {
            debug!("Skipped {} unavailable plugins", missing.len());
        }
    }

    fn on_app_close(&self, _last_screen: &ScreenId) {}
}

/// The debug overlay for one process. Owns the lifecycle hub, the overlay service, the policy
/// coordinator and the plugin registry; at most one can be installed at a time.
pub struct DebugContext {
    host: HostContext,
    lifecycle: LifecycleHub,
    screens: Rc<OptInScreens>,
    service: Rc<OverlayService>,
    coordinator: Rc<DisplayPolicyCoordinator>,
    panel: RefCell<Option<DebugPanel>>,
    subscriptions: Vec<SubscriptionId>,
    owns_slot: bool,
}

impl DebugContext {
    /// Installs the process's debug context. Fails with
    /// [`DebugViewError::ContextAlreadyInstalled`] while another one is alive.
    pub fn install(
        platform: PlatformRef,
        config: Config,
        catalog: PluginCatalog,
    ) -> DebugViewResult<Self> {
        if CONTEXT_INSTALLED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DebugViewError::ContextAlreadyInstalled);
        }

        info!("Installing debug context");
        Ok(Self::build(platform, config, catalog, true))
    }

    fn build(
        platform: PlatformRef,
        config: Config,
        catalog: PluginCatalog,
        owns_slot: bool,
    ) -> Self {
        let host = HostContext::new(platform.clone(), config);
        let lifecycle = LifecycleHub::new();
        let screens = Rc::new(OptInScreens::new());
        let service = Rc::new(OverlayService::new(host.clone()));
        let coordinator = Rc::new(DisplayPolicyCoordinator::new(
            platform,
            service.clone(),
            screens.clone(),
            FallbackEntry::new(host.config.fallback_entry.clone()),
        ));

        // Plugins must be registered before the first screen's policy decision loads them
        let registration = Rc::new(PluginRegistration {
            catalog,
            registry: host.plugins.clone(),
            ids: host.config.optional_plugins.clone(),
        });
        let subscriptions = vec![
            lifecycle.subscribe_app(registration),
            lifecycle.subscribe(coordinator.clone()),
        ];

        Self {
            host,
            lifecycle,
            screens,
            service,
            coordinator,
            panel: RefCell::new(None),
            subscriptions,
            owns_slot,
        }
    }

    /// Whether a context is installed in this process.
    pub fn is_installed() -> bool {
        CONTEXT_INSTALLED.load(Ordering::Acquire)
    }

    pub fn lifecycle(&self) -> &LifecycleHub {
        &self.lifecycle
    }

    /// Forwards a screen lifecycle event from the host.
    pub fn dispatch(&self, screen: &ScreenId, event: ScreenEvent) {
        self.lifecycle.dispatch(screen, event);
    }

    /// Screens that show the overlay. Nothing is opted in initially.
    pub fn screens(&self) -> &OptInScreens {
        &self.screens
    }

    pub fn config(&self) -> &ConfigRef {
        &self.host.config
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.host.plugins
    }

    pub fn service(&self) -> &OverlayService {
        &self.service
    }

    pub fn coordinator(&self) -> &DisplayPolicyCoordinator {
        &self.coordinator
    }

    /// The live debug view, either the overlay's or the open panel's.
    pub fn current_debug_view(&self) -> Option<DebugViewRef> {
        self.host.registry.get()
    }

    /// Runs `f` against the loaded plugin of type `T` in the current debug view.
    pub fn with_plugin<T: DebugPlugin, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.current_debug_view()?.with_plugin(f)
    }

    pub fn show_overlay(&self, foreground: bool) {
        self.service.start(StartRequest { foreground });
    }

    pub fn hide_overlay(&self) {
        self.service.hide();
    }

    pub fn stop_overlay(&self) {
        self.service.stop();
    }

    pub fn dispatch_touch(&self, event: &TouchEvent) -> GestureOutcome {
        self.service.dispatch_touch(event)
    }

    /// Opens the fallback panel, or returns the already open one.
    pub fn open_panel(&self) -> DebugViewRef {
        let mut panel = self.panel.borrow_mut();
        panel
            .get_or_insert_with(|| DebugPanel::open(&self.host))
            .view()
            .clone()
    }

    /// Returns whether a panel was open. A showing overlay becomes the current debug view
    /// again.
    pub fn close_panel(&self) -> bool {
        let Some(panel) = self.panel.borrow_mut().take() else {
            return false;
        };
        drop(panel);

        if self.service.is_overlay_showing() {
            if let Some(view) = self.service.debug_view() {
                self.host.registry.attach(&view);
            }
        }
        true
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel.borrow().is_some()
    }

    /// Performs the tap action of a notification posted by this context.
    pub fn handle_notification_action(&self, action: &NotificationAction) {
        match action {
            NotificationAction::OpenPanel { .. } => {
                self.open_panel();
            }
            NotificationAction::None => {}
        }
    }
}

impl Drop for DebugContext {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.lifecycle.unsubscribe(id);
        }
        self.close_panel();
        self.service.stop();

        if self.owns_slot {
            CONTEXT_INSTALLED.store(false, Ordering::Release);
            info!("Debug context uninstalled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::TouchAction;
    use crate::platform::mock::MockPlatform;
    use crate::plugin::{ContainerKind, PluginContainer, PluginContext, PluginDescriptor};
    use std::any::Any;

    #[derive(Default)]
    struct LogPlugin {
        lines: Vec<String>,
        shown: usize,
    }

    impl DebugPlugin for LogPlugin {
        fn id(&self) -> &str {
            "log_view"
        }

        fn on_load(&mut self, _ctx: &PluginContext, container: &PluginContainer) {
            self.lines.push(format!("loaded into {:?}", container.kind));
        }

        fn on_show(&mut self) {
            self.shown += 1;
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn log_plugin() -> Result<Box<dyn DebugPlugin>, String> {
        Ok(Box::new(LogPlugin::default()))
    }

    fn catalog() -> PluginCatalog {
        PluginCatalog::new(vec![PluginDescriptor::new("log_view", log_plugin)])
    }

    fn context(platform: &Rc<MockPlatform>) -> DebugContext {
        let context = DebugContext::build(platform.clone(), Config::default(), catalog(), false);
        context.screens().opt_in("Checkout");
        context
    }

    fn checkout(instance: u64) -> ScreenId {
        ScreenId::new("Checkout", instance)
    }

    #[test]
    fn test_app_open_registers_available_plugins() {
        let platform = Rc::new(MockPlatform::new());
        let context = context(&platform);

        context.dispatch(&ScreenId::new("Splash", 1), ScreenEvent::Created);

        assert_eq!(context.plugins().ids(), vec!["log_view"]);
        // Splash is not opted in
        assert_eq!(platform.permission_requests(), 0);
    }

    #[test]
    fn test_denied_then_granted_flow() {
        let platform = Rc::new(MockPlatform::new());
        let context = context(&platform);
        let screen = checkout(1);

        context.dispatch(&screen, ScreenEvent::Created);
        context.dispatch(&screen, ScreenEvent::Resumed);
        assert_eq!(platform.permission_requests(), 1);
        assert_eq!(platform.notifications().active().len(), 1);
        assert!(context.current_debug_view().is_none());

        platform.set_can_draw_overlays(true);
        context.dispatch(&screen, ScreenEvent::Paused);
        context.dispatch(&screen, ScreenEvent::Resumed);

        assert!(context.service().is_overlay_showing());
        assert_eq!(platform.windows().view_count(), 1);
        let view = context.current_debug_view().unwrap();
        assert_eq!(view.kind(), ContainerKind::Overlay);
        assert_eq!(view.plugin_ids(), vec!["log_view"]);
        assert_eq!(context.with_plugin(|p: &mut LogPlugin| p.shown), Some(1));
    }

    #[test]
    fn test_touch_drags_overlay() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let context = context(&platform);
        context.dispatch(&checkout(1), ScreenEvent::Created);

        context.dispatch_touch(&TouchEvent::new(TouchAction::Down, 500.0, 500.0));
        context.dispatch_touch(&TouchEvent::new(TouchAction::Move, 520.0, 540.0));
        context.dispatch_touch(&TouchEvent::new(TouchAction::Up, 520.0, 540.0));

        let id = context.current_debug_view().unwrap().id();
        let layout = platform.windows().layout_of(id).unwrap();
        assert_eq!((layout.x, layout.y), (20, 40));
    }

    #[test]
    fn test_notification_action_opens_single_panel() {
        let platform = Rc::new(MockPlatform::new());
        let context = context(&platform);
        context.dispatch(&checkout(1), ScreenEvent::Created);

        let (_, entry) = platform.notifications().active().remove(0);
        context.handle_notification_action(&entry.action);
        let first = context.current_debug_view().unwrap();
        context.handle_notification_action(&entry.action);

        assert_eq!(first.kind(), ContainerKind::Panel);
        assert_eq!(context.current_debug_view().unwrap().id(), first.id());
        assert_eq!(
            context.with_plugin(|p: &mut LogPlugin| p.lines.clone()),
            Some(vec!["loaded into Panel".to_string()])
        );

        drop(first);
        assert!(context.close_panel());
        assert!(context.current_debug_view().is_none());
    }

    #[test]
    fn test_closing_panel_restores_showing_overlay() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let context = context(&platform);
        context.dispatch(&checkout(1), ScreenEvent::Created);
        let overlay_id = context.current_debug_view().unwrap().id();

        // A stale entry left in the shade is tapped while the overlay shows
        context.handle_notification_action(&NotificationAction::OpenPanel {
            new_task: true,
            single_top: true,
        });
        assert_eq!(
            context.current_debug_view().unwrap().kind(),
            ContainerKind::Panel
        );
        assert!(context.close_panel());

        let current = context.current_debug_view().unwrap();
        assert_eq!(current.id(), overlay_id);
        assert_eq!(platform.windows().view_count(), 1);
        assert_eq!(context.with_plugin(|p: &mut LogPlugin| p.shown), Some(1));
    }

    #[test]
    fn test_close_panel_without_panel() {
        let platform = Rc::new(MockPlatform::new());
        let context = context(&platform);

        assert!(!context.close_panel());
        assert!(context.current_debug_view().is_none());
    }

    #[test]
    fn test_hide_keeps_window_attached() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let context = context(&platform);
        context.show_overlay(false);

        context.hide_overlay();

        assert!(!context.current_debug_view().unwrap().is_visible());
        assert_eq!(platform.windows().view_count(), 1);

        context.stop_overlay();
        assert_eq!(platform.windows().view_count(), 0);
        assert!(!context.service().is_running());
    }

    #[test]
    fn test_drop_unsubscribes_and_stops() {
        let platform = Rc::new(MockPlatform::new());
        platform.set_can_draw_overlays(true);
        let context = context(&platform);
        context.dispatch(&checkout(1), ScreenEvent::Created);
        context.open_panel();
        assert_eq!(context.lifecycle().listener_count(), 2);

        drop(context);

        assert_eq!(platform.windows().view_count(), 0);
        assert!(platform.foreground().is_none());
    }

    #[test]
    fn test_second_install_fails_while_first_is_alive() {
        let platform = Rc::new(MockPlatform::new());

        let first = DebugContext::install(platform.clone(), Config::default(), catalog()).unwrap();
        assert!(DebugContext::is_installed());
        assert!(matches!(
            DebugContext::install(platform.clone(), Config::default(), catalog()),
            Err(DebugViewError::ContextAlreadyInstalled)
        ));

        drop(first);
        assert!(!DebugContext::is_installed());
        let again = DebugContext::install(platform.clone(), Config::default(), catalog());
        assert!(again.is_ok());
    }
}
