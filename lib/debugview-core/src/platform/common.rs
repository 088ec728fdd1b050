use bitflags::bitflags;
use std::backtrace::Backtrace;
use std::fmt::{self, Display};

#[derive(Debug)]
pub struct PlatformError {
    pub error_type: PlatformErrorType,
    pub backtrace: Backtrace,
}

#[derive(Debug)]
pub enum PlatformErrorType {
    Error(String),
}

impl Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            PlatformErrorType::Error(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for PlatformError {}

impl From<PlatformErrorType> for PlatformError {
    fn from(error_type: PlatformErrorType) -> Self {
        Self {
            error_type,
            backtrace: Backtrace::capture(),
        }
    }
}

impl From<&str> for PlatformError {
    fn from(error: &str) -> Self {
        PlatformErrorType::Error(error.to_string()).into()
    }
}

impl From<String> for PlatformError {
    fn from(error: String) -> Self {
        PlatformErrorType::Error(error).into()
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Generation id of an overlay view. Ids are never reused within a process.
pub type OverlayId = u64;
pub type NotificationId = i32;

/// First platform version that gates overlay windows behind a runtime permission.
pub const OVERLAY_PERMISSION_API_LEVEL: u32 = 23;
/// First platform version with the dedicated application overlay window type.
pub const APPLICATION_OVERLAY_API_LEVEL: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub position: Position,
    pub size: Size,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            position: Position::new(x, y),
            size: Size::new(width, height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Dedicated overlay type on newer platforms.
    ApplicationOverlay,
    /// Legacy system window type used before the overlay type existed.
    Phone,
}

impl WindowType {
    pub fn for_api_level(api_level: u32) -> Self {
        if api_level >= APPLICATION_OVERLAY_API_LEVEL {
            WindowType::ApplicationOverlay
        } else {
            WindowType::Phone
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const NOT_FOCUSABLE = 1 << 0;
        const LAYOUT_IN_SCREEN = 1 << 1;
        const NOT_TOUCH_MODAL = 1 << 2;
    }
}

/// Parameters a window is registered with. Windows are translucent and `x`/`y` are measured
/// from the top-left corner of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowLayout {
    pub width: u32,
    pub height: u32,
    pub window_type: WindowType,
    pub flags: WindowFlags,
    pub x: i32,
    pub y: i32,
}

impl WindowLayout {
    /// Layout for a floating overlay that never takes focus and never blocks touches outside
    /// its own bounds.
    pub fn overlay(bounds: Bounds, api_level: u32) -> Self {
        Self {
            width: bounds.size.width,
            height: bounds.size.height,
            window_type: WindowType::for_api_level(api_level),
            flags: WindowFlags::NOT_FOCUSABLE
                | WindowFlags::LAYOUT_IN_SCREEN
                | WindowFlags::NOT_TOUCH_MODAL,
            x: bounds.position.x,
            y: bounds.position.y,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A low importance channel: posts to it never make sound or peek onto the screen.
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
}

/// What the host does when a notification is tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    None,
    /// Open the full-screen debug panel.
    OpenPanel { new_task: bool, single_top: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel_id: Option<String>,
    pub icon: &'static str,
    pub title: String,
    pub text: String,
    pub auto_cancel: bool,
    pub ongoing: bool,
    pub action: NotificationAction,
}
