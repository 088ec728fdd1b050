use crate::drag::{reposition, resolve_window_size, DragDelta, GestureOutcome, TouchEvent};
use crate::error::DebugViewError;
use crate::overlay::HostContext;
use crate::platform::{Size, WindowLayout, WindowManagerImpl};
use crate::plugin::{ContainerKind, DebugView, DebugViewRef};
use log::{debug, error, info, trace, warn};
use once_cell::unsync::OnceCell;
use std::rc::Rc;

/// Attach/detach lifecycle of the overlay window. All calls happen on the UI thread.
pub trait OverlaySessionImpl {
    /// Registers the overlay window with the platform. Does nothing when already attached.
    /// If the window manager is unavailable the session stays detached and the call may be
    /// retried later.
    fn attach(&mut self, host: &HostContext);

    fn is_attached(&self) -> bool;

    /// The host context of the most recent `attach`.
    fn host(&self) -> Option<HostContext>;

    fn debug_view(&self) -> Option<DebugViewRef>;

    fn load_plugin(&mut self);

    fn show_plugin(&mut self);

    fn hide_plugin(&mut self);

    /// Removes the window if attached and releases the view. Safe to call repeatedly and
    /// from the detached state.
    fn on_destroy(&mut self);

    fn handle_touch(&mut self, event: &TouchEvent) -> GestureOutcome;

    /// Tears this session down completely, then brings `next` up on the same host, so at most
    /// one window is registered at any time.
    fn switch_state(&mut self, next: Option<&mut dyn OverlaySessionImpl>) {
        let host = self.host();
        self.on_destroy();

        match (next, host) {
            (Some(next), Some(host)) => {
                next.attach(&host);
                next.load_plugin();
            }
            (Some(_), None) => warn!("Cannot switch overlay session: no host context"),
            (None, _) => {}
        }
    }
}

/// A session backed by a floating system window.
#[derive(Default)]
pub struct WindowSession {
    host: Option<HostContext>,
    view: Option<DebugViewRef>,
    window_manager: Option<Rc<dyn WindowManagerImpl>>,
    layout: Option<WindowLayout>,
    screen_size: OnceCell<Size>,
    attached: bool,
}

impl WindowSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> Option<&WindowLayout> {
        self.layout.as_ref()
    }

    pub fn screen_size(&self) -> Option<Size> {
        self.screen_size.get().copied()
    }

    fn ensure_debug_view(&mut self, host: &HostContext) -> DebugViewRef {
        self.view
            .get_or_insert_with(|| {
                let view = Rc::new(DebugView::new(
                    host.registry.allocate_id(),
                    ContainerKind::Overlay,
                ));
                host.registry.attach(&view);
                debug!("Created overlay view {}", view.id());
                view
            })
            .clone()
    }

    fn ensure_window_manager(&mut self, host: &HostContext) -> Option<Rc<dyn WindowManagerImpl>> {
        if self.window_manager.is_none() {
            self.window_manager = host.platform.window_manager();
        }
        self.window_manager.clone()
    }

    fn ensure_screen_size(&mut self) {
        if self.screen_size.get().is_some() {
            return;
        }
        let Some(host) = &self.host else {
            return;
        };
        if let Some(size) = host.platform.display_size().filter(|s| !s.is_empty()) {
            trace!("Resolved screen size {}x{}", size.width, size.height);
            let _ = self.screen_size.set(size);
        }
    }

    fn handle_window_move(&mut self, view: &DebugView, delta: DragDelta) {
        if !self.attached {
            return;
        }
        self.ensure_screen_size();

        let (Some(window_manager), Some(layout)) = (&self.window_manager, self.layout.as_mut())
        else {
            return;
        };

        let window = resolve_window_size(view.rendered_size(), layout.size());
        let screen = self.screen_size.get().copied().unwrap_or_default();
        let next = reposition(layout.position(), delta, window, screen);
        if next == layout.position() {
            return;
        }

        layout.x = next.x;
        layout.y = next.y;
        if let Err(e) = window_manager.update_view_layout(view.id(), layout) {
            error!("Failed to move overlay window {}: {e}", view.id());
        }
    }
}

impl OverlaySessionImpl for WindowSession {
    fn attach(&mut self, host: &HostContext) {
        self.host = Some(host.clone());
        // The view stays tracked while detached so plugins and lookups keep working until a
        // later attach succeeds
        let view = self.ensure_debug_view(host);
        if self.attached {
            return;
        }

        let Some(window_manager) = self.ensure_window_manager(host) else {
            warn!("{}; overlay stays detached", DebugViewError::WindowManagerUnavailable);
            return;
        };

        self.ensure_screen_size();
        // Every attachment starts from the configured position, not the last dragged one
        let layout = WindowLayout::overlay(host.config.initial_bounds(), host.platform.api_level());

        match window_manager.add_view(view.id(), &layout) {
            Ok(()) => {
                info!(
                    "Attached overlay window {} at ({}, {}) {}x{}",
                    view.id(),
                    layout.x,
                    layout.y,
                    layout.width,
                    layout.height
                );
                self.layout = Some(layout);
                self.attached = true;
            }
            Err(e) => {
                error!("Failed to attach overlay window {}: {e}", view.id());
                self.screen_size.take();
            }
        }
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn host(&self) -> Option<HostContext> {
        self.host.clone()
    }

    fn debug_view(&self) -> Option<DebugViewRef> {
        self.view.clone()
    }

    fn load_plugin(&mut self) {
        if let (Some(view), Some(host)) = (&self.view, &self.host) {
            view.load_plugins(&host.plugin_context(), &host.plugins);
        }
    }

    fn show_plugin(&mut self) {
        if let Some(view) = &self.view {
            view.set_visible(true);
        }
    }

    fn hide_plugin(&mut self) {
        if let Some(view) = &self.view {
            view.set_visible(false);
        }
    }

    fn on_destroy(&mut self) {
        if self.attached {
            if let (Some(window_manager), Some(view)) = (&self.window_manager, &self.view) {
                match window_manager.remove_view(view.id()) {
                    Ok(()) => info!("Detached overlay window {}", view.id()),
                    Err(e) => warn!("Failed to detach overlay window {}: {e}", view.id()),
                }
            }
        }

        self.attached = false;
        self.screen_size.take();
        self.layout = None;
        self.window_manager = None;

        if let Some(view) = self.view.take() {
            view.set_visible(false);
            view.unload_plugins();
            if let Some(host) = &self.host {
                host.registry.detach(&view);
            }
        }
    }

    fn handle_touch(&mut self, event: &TouchEvent) -> GestureOutcome {
        let Some(view) = self.view.clone() else {
            return GestureOutcome::Ignored;
        };

        let outcome = view.on_touch(event);
        if let GestureOutcome::Moved(delta) = outcome {
            self.handle_window_move(&view, delta);
        }
        outcome
    }
}
