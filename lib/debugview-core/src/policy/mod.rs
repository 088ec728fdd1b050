mod eligibility;
mod fallback;

pub use eligibility::{DebugUiScreen, EligibilityPredicate, OptInScreens};
pub use fallback::{FallbackEntry, NOTIFICATION_CHANNEL_API_LEVEL};

use crate::lifecycle::{ScreenEvent, ScreenId, ScreenLifecycleListener};
use crate::overlay::StartRequest;
use crate::platform::{has_overlay_permission, PlatformRef, OVERLAY_PERMISSION_API_LEVEL};
use log::{debug, info, warn};
use std::cell::Cell;
use std::rc::Rc;

/// The screen transitions the policy reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTransition {
    Created,
    Resumed,
}

impl ScreenTransition {
    pub fn from_event(event: ScreenEvent) -> Option<Self> {
        match event {
            ScreenEvent::Created => Some(Self::Created),
            ScreenEvent::Resumed => Some(Self::Resumed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDecision {
    ShowOverlay,
    ShowFallbackEntry,
    RequestPermissionAndShowFallbackEntry,
    NoOp,
}

/// The coordinator's view of the overlay service.
pub trait OverlayLauncher {
    fn is_overlay_showing(&self) -> bool;

    fn start_overlay(&self, request: StartRequest);
}

/// Chooses between the floating overlay and the notification entry on every eligible screen
/// transition.
pub struct DisplayPolicyCoordinator {
    platform: PlatformRef,
    launcher: Rc<dyn OverlayLauncher>,
    eligibility: Rc<dyn EligibilityPredicate>,
    fallback: FallbackEntry,
    requested_permission: Cell<bool>,
}

impl DisplayPolicyCoordinator {
    pub fn new(
        platform: PlatformRef,
        launcher: Rc<dyn OverlayLauncher>,
        eligibility: Rc<dyn EligibilityPredicate>,
        fallback: FallbackEntry,
    ) -> Self {
        Self {
            platform,
            launcher,
            eligibility,
            fallback,
            requested_permission: Cell::new(false),
        }
    }

    pub fn on_screen_created(&self, screen: &ScreenId) -> DisplayDecision {
        self.handle(screen, ScreenTransition::Created)
    }

    pub fn on_screen_resumed(&self, screen: &ScreenId) -> DisplayDecision {
        self.handle(screen, ScreenTransition::Resumed)
    }

    /// Whether the one-shot permission request has been used up.
    pub fn has_requested_permission(&self) -> bool {
        self.requested_permission.get()
    }

    /// Evaluates the policy without acting on it.
    pub fn decide(&self, screen: &ScreenId, transition: ScreenTransition) -> DisplayDecision {
        if !self.eligibility.is_eligible(screen) || self.launcher.is_overlay_showing() {
            return DisplayDecision::NoOp;
        }

        if has_overlay_permission(self.platform.as_ref()) {
            return DisplayDecision::ShowOverlay;
        }

        match transition {
            ScreenTransition::Created
                if !self.requested_permission.get()
                    && self.platform.api_level() >= OVERLAY_PERMISSION_API_LEVEL =>
            {
                DisplayDecision::RequestPermissionAndShowFallbackEntry
            }
            _ => DisplayDecision::ShowFallbackEntry,
        }
    }

    pub fn apply(&self, decision: DisplayDecision) {
        match decision {
            DisplayDecision::NoOp => {}
            DisplayDecision::ShowOverlay => {
                self.launcher.start_overlay(StartRequest::background());
            }
            DisplayDecision::ShowFallbackEntry => {
                self.fallback.show(self.platform.as_ref());
            }
            DisplayDecision::RequestPermissionAndShowFallbackEntry => {
                self.fallback.show(self.platform.as_ref());
                self.request_permission();
            }
        }
    }

    fn handle(&self, screen: &ScreenId, transition: ScreenTransition) -> DisplayDecision {
        let decision = self.decide(screen, transition);
        if decision != DisplayDecision::NoOp {
            debug!("{screen} {transition:?}: {decision:?}");
        }
        self.apply(decision);
        decision
    }

    fn request_permission(&self) {
        if self.requested_permission.replace(true) {
            return;
        }
        info!("Requesting overlay permission");
        if let Err(e) = self.platform.open_overlay_permission_settings() {
            warn!("Failed to open overlay permission settings: {e}");
        }
    }
}

impl ScreenLifecycleListener for DisplayPolicyCoordinator {
    fn on_screen_event(&self, screen: &ScreenId, event: ScreenEvent) {
        match ScreenTransition::from_event(event) {
            Some(ScreenTransition::Created) => {
                self.on_screen_created(screen);
            }
            Some(ScreenTransition::Resumed) => {
                self.on_screen_resumed(screen);
            }
            None => {}
        }
    }
}
