//! In-memory platform that records every call. Backs the unit tests and the headless CLI driver.

use crate::platform::{
    Notification, NotificationChannel, NotificationId, NotificationManagerImpl, OverlayId,
    PlatformErrorType, PlatformImpl, PlatformResult, Size, WindowLayout, WindowManagerImpl,
};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct MockWindowManager {
    views: RefCell<IndexMap<OverlayId, WindowLayout>>,
    updates: RefCell<Vec<(OverlayId, WindowLayout)>>,
    add_calls: Cell<usize>,
    remove_calls: Cell<usize>,
    peak_views: Cell<usize>,
    fail_add: Cell<bool>,
}

impl MockWindowManager {
    pub fn views(&self) -> Vec<(OverlayId, WindowLayout)> {
        self.views
            .borrow()
            .iter()
            .map(|(id, layout)| (*id, layout.clone()))
            .collect()
    }

    pub fn layout_of(&self, view: OverlayId) -> Option<WindowLayout> {
        self.views.borrow().get(&view).cloned()
    }

    pub fn view_count(&self) -> usize {
        self.views.borrow().len()
    }

    /// Largest number of windows that were registered at the same time.
    pub fn peak_view_count(&self) -> usize {
        self.peak_views.get()
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.get()
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.get()
    }

    pub fn updates(&self) -> Vec<(OverlayId, WindowLayout)> {
        self.updates.borrow().clone()
    }

    /// Makes every following `add_view` fail.
    pub fn set_fail_add(&self, fail: bool) {
        self.fail_add.set(fail);
    }
}

impl WindowManagerImpl for MockWindowManager {
    fn add_view(&self, view: OverlayId, layout: &WindowLayout) -> PlatformResult<()> {
        self.add_calls.set(self.add_calls.get() + 1);
        if self.fail_add.get() {
            return Err("window registration rejected".into());
        }

        let mut views = self.views.borrow_mut();
        if views.contains_key(&view) {
            return Err(format!("view {view} is already added").into());
        }
        views.insert(view, layout.clone());
        self.peak_views.set(self.peak_views.get().max(views.len()));
        Ok(())
    }

    fn update_view_layout(&self, view: OverlayId, layout: &WindowLayout) -> PlatformResult<()> {
        let mut views = self.views.borrow_mut();
        let current = views
            .get_mut(&view)
            .ok_or_else(|| format!("view {view} is not attached"))?;
        *current = layout.clone();
        self.updates.borrow_mut().push((view, layout.clone()));
        Ok(())
    }

    fn remove_view(&self, view: OverlayId) -> PlatformResult<()> {
        self.remove_calls.set(self.remove_calls.get() + 1);
        self.views
            .borrow_mut()
            .shift_remove(&view)
            .map(|_| ())
            .ok_or_else(|| format!("view {view} is not attached").into())
    }
}

#[derive(Debug, Default)]
pub struct MockNotificationManager {
    channels: RefCell<IndexMap<String, NotificationChannel>>,
    active: RefCell<IndexMap<NotificationId, Notification>>,
    notify_calls: Cell<usize>,
}

impl MockNotificationManager {
    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.channels.borrow().values().cloned().collect()
    }

    /// Notifications currently shown, in the order they were first posted.
    pub fn active(&self) -> Vec<(NotificationId, Notification)> {
        self.active
            .borrow()
            .iter()
            .map(|(id, notification)| (*id, notification.clone()))
            .collect()
    }

    pub fn notify_calls(&self) -> usize {
        self.notify_calls.get()
    }
}

impl NotificationManagerImpl for MockNotificationManager {
    fn create_channel(&self, channel: &NotificationChannel) -> PlatformResult<()> {
        self.channels
            .borrow_mut()
            .insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    fn notify(&self, id: NotificationId, notification: &Notification) -> PlatformResult<()> {
        self.notify_calls.set(self.notify_calls.get() + 1);
        self.active.borrow_mut().insert(id, notification.clone());
        Ok(())
    }
}

#[derive(Debug)]
struct MockPlatformState {
    api_level: u32,
    can_draw_overlays: bool,
    window_manager_available: bool,
    notifications_available: bool,
    display_size: Option<Size>,
    permission_requests: usize,
    foreground: Option<(u32, Notification)>,
    foreground_starts: usize,
}

#[derive(Debug)]
pub struct MockPlatform {
    window_manager: Rc<MockWindowManager>,
    notifications: Rc<MockNotificationManager>,
    state: RefCell<MockPlatformState>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// A recent platform with a 1080x1920 display and no overlay permission.
    pub fn new() -> Self {
        Self {
            window_manager: Rc::new(MockWindowManager::default()),
            notifications: Rc::new(MockNotificationManager::default()),
            state: RefCell::new(MockPlatformState {
                api_level: 34,
                can_draw_overlays: false,
                window_manager_available: true,
                notifications_available: true,
                display_size: Some(Size::new(1080, 1920)),
                permission_requests: 0,
                foreground: None,
                foreground_starts: 0,
            }),
        }
    }

    pub fn windows(&self) -> &MockWindowManager {
        &self.window_manager
    }

    pub fn notifications(&self) -> &MockNotificationManager {
        &self.notifications
    }

    pub fn set_api_level(&self, api_level: u32) {
        self.state.borrow_mut().api_level = api_level;
    }

    pub fn set_can_draw_overlays(&self, granted: bool) {
        self.state.borrow_mut().can_draw_overlays = granted;
    }

    pub fn set_window_manager_available(&self, available: bool) {
        self.state.borrow_mut().window_manager_available = available;
    }

    pub fn set_notifications_available(&self, available: bool) {
        self.state.borrow_mut().notifications_available = available;
    }

    pub fn set_display_size(&self, size: Option<Size>) {
        self.state.borrow_mut().display_size = size;
    }

    /// Number of times the permission settings screen was launched.
    pub fn permission_requests(&self) -> usize {
        self.state.borrow().permission_requests
    }

    pub fn foreground(&self) -> Option<(u32, Notification)> {
        self.state.borrow().foreground.clone()
    }

    pub fn foreground_starts(&self) -> usize {
        self.state.borrow().foreground_starts
    }
}

impl PlatformImpl for MockPlatform {
    fn api_level(&self) -> u32 {
        self.state.borrow().api_level
    }

    fn window_manager(&self) -> Option<Rc<dyn WindowManagerImpl>> {
        if !self.state.borrow().window_manager_available {
            return None;
        }
        Some(self.window_manager.clone())
    }

    fn notification_manager(&self) -> Option<Rc<dyn NotificationManagerImpl>> {
        if !self.state.borrow().notifications_available {
            return None;
        }
        Some(self.notifications.clone())
    }

    fn display_size(&self) -> Option<Size> {
        self.state.borrow().display_size
    }

    fn can_draw_overlays(&self) -> bool {
        self.state.borrow().can_draw_overlays
    }

    fn open_overlay_permission_settings(&self) -> PlatformResult<()> {
        self.state.borrow_mut().permission_requests += 1;
        Ok(())
    }

    fn start_foreground(&self, id: u32, notification: &Notification) -> PlatformResult<()> {
        if id == 0 {
            return Err(PlatformErrorType::Error("foreground id must be non-zero".into()).into());
        }
        let mut state = self.state.borrow_mut();
        state.foreground = Some((id, notification.clone()));
        state.foreground_starts += 1;
        Ok(())
    }

    fn stop_foreground(&self) -> PlatformResult<()> {
        self.state.borrow_mut().foreground = None;
        Ok(())
    }
}
