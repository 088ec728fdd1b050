use crate::platform::{
    Notification, NotificationChannel, NotificationId, OverlayId, PlatformResult, Size,
    WindowLayout,
};
use std::rc::Rc;

/// The platform's window manager. Views are identified by their overlay id.
pub trait WindowManagerImpl {
    /// Registers a new window. Adding an id that is already registered is an error.
    fn add_view(&self, view: OverlayId, layout: &WindowLayout) -> PlatformResult<()>;

    /// Applies a new layout to an already registered window.
    fn update_view_layout(&self, view: OverlayId, layout: &WindowLayout) -> PlatformResult<()>;

    fn remove_view(&self, view: OverlayId) -> PlatformResult<()>;
}

pub trait NotificationManagerImpl {
    /// Creating a channel that already exists updates it.
    fn create_channel(&self, channel: &NotificationChannel) -> PlatformResult<()>;

    /// Posting with an id that is already showing replaces that notification.
    fn notify(&self, id: NotificationId, notification: &Notification) -> PlatformResult<()>;
}

/// Everything the overlay needs from the host platform. All calls happen on the UI thread.
pub trait PlatformImpl {
    fn api_level(&self) -> u32;

    /// Returns `None` when the window manager service cannot be obtained.
    fn window_manager(&self) -> Option<Rc<dyn WindowManagerImpl>>;

    /// Returns `None` when the notification service cannot be obtained.
    fn notification_manager(&self) -> Option<Rc<dyn NotificationManagerImpl>>;

    /// Size of the default display in pixels, if known.
    fn display_size(&self) -> Option<Size>;

    /// Whether this process may currently draw system-level overlay windows. Can change at any
    /// time outside the process's control, so callers must not cache it.
    fn can_draw_overlays(&self) -> bool;

    /// Launches the settings screen where the user grants the overlay permission.
    fn open_overlay_permission_settings(&self) -> PlatformResult<()>;

    /// Elevates the host service to foreground mode with a visible notification.
    fn start_foreground(&self, id: u32, notification: &Notification) -> PlatformResult<()>;

    fn stop_foreground(&self) -> PlatformResult<()>;
}

pub type PlatformRef = Rc<dyn PlatformImpl>;

/// Overlay permission as the policy sees it. Platforms that predate the runtime permission
/// always allow overlays.
pub fn has_overlay_permission(platform: &dyn PlatformImpl) -> bool {
    platform.api_level() < crate::platform::OVERLAY_PERMISSION_API_LEVEL
        || platform.can_draw_overlays()
}
