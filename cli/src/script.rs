use debugview_core::drag::{TouchAction, TouchEvent};
use debugview_core::lifecycle::{ScreenEvent, ScreenId};
use debugview_core::platform::mock::MockPlatform;
use debugview_core::platform::Size;
use debugview_core::policy::ScreenTransition;
use debugview_core::DebugContext;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;

use crate::plugins::LogViewPlugin;

/// Denied on first launch, granted from settings, dragged, then closed.
pub const DEMO_SCRIPT: &str = r#"
opt_in: [Checkout]
steps:
  - created: { name: Checkout, instance: 1 }
  - resumed: { name: Checkout, instance: 1 }
  - tap_entry
  - close_panel
  - grant_permission
  - paused: { name: Checkout, instance: 1 }
  - resumed: { name: Checkout, instance: 1 }
  - layout: { width: 200, height: 100 }
  - touch: { action: down, x: 400, y: 400 }
  - touch: { action: move, x: 350, y: 430 }
  - touch: { action: up, x: 350, y: 430 }
  - destroyed: { name: Checkout, instance: 1 }
"#;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Script {
    pub api_level: u32,
    /// Screen names that show the overlay
    pub opt_in: Vec<String>,
    pub steps: Vec<Step>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            api_level: 34,
            opt_in: Vec::new(),
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenRef {
    pub name: String,
    #[serde(default)]
    pub instance: u64,
}

impl From<&ScreenRef> for ScreenId {
    fn from(screen: &ScreenRef) -> Self {
        ScreenId::new(screen.name.clone(), screen.instance)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchKind {
    Down,
    Move,
    Up,
    Cancel,
}

impl From<TouchKind> for TouchAction {
    fn from(kind: TouchKind) -> Self {
        match kind {
            TouchKind::Down => TouchAction::Down,
            TouchKind::Move => TouchAction::Move,
            TouchKind::Up => TouchAction::Up,
            TouchKind::Cancel => TouchAction::Cancel,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Created(ScreenRef),
    Started(ScreenRef),
    Resumed(ScreenRef),
    Paused(ScreenRef),
    Stopped(ScreenRef),
    Destroyed(ScreenRef),
    GrantPermission,
    RevokePermission,
    Touch { action: TouchKind, x: f32, y: f32 },
    Layout { width: u32, height: u32 },
    ShowOverlay {
        #[serde(default)]
        foreground: bool,
    },
    HideOverlay,
    StopOverlay,
    /// Taps the posted fallback entry
    TapEntry,
    ClosePanel,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let source = std::fs::read_to_string(path)?;
                Ok(Self::parse(&source)?)
            }
            None => Ok(Self::parse(DEMO_SCRIPT)?),
        }
    }
}

/// Replays script steps against an installed context.
pub struct ScriptRunner<'a> {
    platform: &'a MockPlatform,
    context: &'a DebugContext,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(platform: &'a MockPlatform, context: &'a DebugContext) -> Self {
        Self { platform, context }
    }

    pub fn run(&self, steps: &[Step]) {
        for (index, step) in steps.iter().enumerate() {
            info!("Step {}: {step:?}", index + 1);
            self.run_step(step);
            self.append_to_log_view(index + 1);
        }
    }

    fn run_step(&self, step: &Step) {
        match step {
            Step::Created(screen) => self.screen_event(screen, ScreenEvent::Created),
            Step::Started(screen) => self.screen_event(screen, ScreenEvent::Started),
            Step::Resumed(screen) => self.screen_event(screen, ScreenEvent::Resumed),
            Step::Paused(screen) => self.screen_event(screen, ScreenEvent::Paused),
            Step::Stopped(screen) => self.screen_event(screen, ScreenEvent::Stopped),
            Step::Destroyed(screen) => self.screen_event(screen, ScreenEvent::Destroyed),
            Step::GrantPermission => self.platform.set_can_draw_overlays(true),
            Step::RevokePermission => self.platform.set_can_draw_overlays(false),
            Step::Touch { action, x, y } => {
                let outcome = self
                    .context
                    .dispatch_touch(&TouchEvent::new((*action).into(), *x, *y));
                info!("Touch outcome: {outcome:?}");
            }
            Step::Layout { width, height } => match self.context.current_debug_view() {
                Some(view) => view.on_layout(Size::new(*width, *height)),
                None => warn!("No debug view to lay out"),
            },
            Step::ShowOverlay { foreground } => self.context.show_overlay(*foreground),
            Step::HideOverlay => self.context.hide_overlay(),
            Step::StopOverlay => self.context.stop_overlay(),
            Step::TapEntry => self.tap_entry(),
            Step::ClosePanel => {
                if !self.context.close_panel() {
                    warn!("No debug panel is open");
                }
            }
        }
    }

    fn screen_event(&self, screen: &ScreenRef, event: ScreenEvent) {
        let screen = ScreenId::from(screen);
        if let Some(transition) = ScreenTransition::from_event(event) {
            let decision = self.context.coordinator().decide(&screen, transition);
            info!("Policy for {screen} {transition:?}: {decision:?}");
        }
        self.context.dispatch(&screen, event);
    }

    fn tap_entry(&self) {
        let entry_id = self.context.config().fallback_entry.notification_id;
        let entry = self
            .platform
            .notifications()
            .active()
            .into_iter()
            .find(|(id, _)| *id == entry_id);

        match entry {
            Some((_, notification)) => self.context.handle_notification_action(&notification.action),
            None => warn!("No debug panel entry has been posted"),
        }
    }

    fn append_to_log_view(&self, step: usize) {
        self.context
            .with_plugin(|log_view: &mut LogViewPlugin| log_view.append(format!("step {step}")));
    }

    /// Logs where the overlay ended up.
    pub fn summarize(&self) {
        let windows = self.platform.windows();
        info!(
            "Overlay showing: {}, windows: {}, permission requests: {}, entries: {}",
            self.context.service().is_overlay_showing(),
            windows.view_count(),
            self.platform.permission_requests(),
            self.platform.notifications().active().len()
        );
        for (id, layout) in windows.views() {
            info!("Window {id} at ({}, {}) {}x{}", layout.x, layout.y, layout.width, layout.height);
        }
        if let Some(lines) = self
            .context
            .with_plugin(|log_view: &mut LogViewPlugin| log_view.lines().len())
        {
            info!("Log view collected {lines} lines");
        }
    }
}
