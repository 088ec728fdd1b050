use debugview_core::drag::{TouchAction, TouchEvent};
use debugview_core::lifecycle::{ScreenEvent, ScreenId};
use debugview_core::platform::mock::MockPlatform;
use debugview_core::platform::{NotificationAction, Size};
use debugview_core::plugin::{
    ContainerKind, DebugPlugin, PluginCatalog, PluginContainer, PluginContext, PluginDescriptor,
};
use debugview_core::{Config, DebugContext, DebugViewError};
use std::any::Any;
use std::rc::Rc;

struct MarkerPlugin;

impl DebugPlugin for MarkerPlugin {
    fn id(&self) -> &str {
        "marker"
    }

    fn on_load(&mut self, _ctx: &PluginContext, _container: &PluginContainer) {}

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn marker() -> Result<Box<dyn DebugPlugin>, String> {
    Ok(Box::new(MarkerPlugin))
}

fn broken() -> Result<Box<dyn DebugPlugin>, String> {
    Err("needs a capability the host lacks".to_string())
}

fn config() -> Config {
    Config {
        window_width: 200,
        window_height: 100,
        initial_x: 100,
        initial_y: 200,
        optional_plugins: vec!["marker".into(), "broken".into(), "absent".into()],
        ..Config::default()
    }
}

// Installs once per process, so the whole journey lives in one test.
#[test]
fn test_permission_journey() {
    let platform = Rc::new(MockPlatform::new());
    let catalog = PluginCatalog::new(vec![
        PluginDescriptor::new("marker", marker),
        PluginDescriptor::new("broken", broken),
    ]);
    let context = DebugContext::install(platform.clone(), config(), catalog).unwrap();
    context.screens().opt_in("Checkout");

    assert!(matches!(
        DebugContext::install(platform.clone(), Config::default(), PluginCatalog::default()),
        Err(DebugViewError::ContextAlreadyInstalled)
    ));

    // Denied: the entry is posted and permission is requested once
    let first = ScreenId::new("Checkout", 1);
    context.dispatch(&first, ScreenEvent::Created);
    context.dispatch(&first, ScreenEvent::Resumed);
    assert_eq!(platform.permission_requests(), 1);
    let entries = platform.notifications().active();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, 22001);
    assert!(matches!(
        entries[0].1.action,
        NotificationAction::OpenPanel { .. }
    ));
    assert_eq!(platform.windows().add_calls(), 0);

    // The entry opens the panel
    context.handle_notification_action(&entries[0].1.action);
    let panel = context.current_debug_view().unwrap();
    assert_eq!(panel.kind(), ContainerKind::Panel);
    assert_eq!(panel.plugin_ids(), vec!["marker"]);
    drop(panel);
    assert!(context.close_panel());

    // Granted in settings, then back to the app
    platform.set_can_draw_overlays(true);
    context.dispatch(&first, ScreenEvent::Paused);
    context.dispatch(&first, ScreenEvent::Resumed);
    assert!(context.service().is_overlay_showing());
    assert_eq!(platform.permission_requests(), 1);
    assert_eq!(platform.notifications().notify_calls(), 2);

    let overlay = context.current_debug_view().unwrap();
    assert_eq!(overlay.kind(), ContainerKind::Overlay);
    assert!(context.with_plugin(|_: &mut MarkerPlugin| ()).is_some());

    // Drag
    overlay.on_layout(Size::new(200, 100));
    context.dispatch_touch(&TouchEvent::new(TouchAction::Down, 400.0, 400.0));
    context.dispatch_touch(&TouchEvent::new(TouchAction::Move, 350.0, 430.0));
    context.dispatch_touch(&TouchEvent::new(TouchAction::Up, 350.0, 430.0));
    let layout = platform.windows().layout_of(overlay.id()).unwrap();
    assert_eq!((layout.x, layout.y), (50, 230));

    // A second screen does nothing while the overlay shows
    context.dispatch(&ScreenId::new("Checkout", 2), ScreenEvent::Created);
    assert_eq!(platform.windows().add_calls(), 1);
    drop(overlay);

    drop(context);
    assert_eq!(platform.windows().view_count(), 0);
    assert!(!DebugContext::is_installed());
}
