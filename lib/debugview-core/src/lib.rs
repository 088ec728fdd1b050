pub mod config;
mod context;
pub mod drag;
mod error;
pub mod lifecycle;
pub mod overlay;
mod panel;
pub mod paths;
pub mod platform;
pub mod plugin;
pub mod policy;

pub use config::Config;
pub use context::DebugContext;
pub use error::{DebugViewError, DebugViewResult};
pub use panel::DebugPanel;

pub fn version() -> &'static str {
    option_env!("VERSION").unwrap_or("v0.0.0-dev")
}
