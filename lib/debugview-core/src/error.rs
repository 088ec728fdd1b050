use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebugViewError {
    #[error("Window manager service is unavailable")]
    WindowManagerUnavailable,
    #[error("Plugin {0} is not available in this build")]
    PluginMissing(String),
    #[error("Failed to load plugin {id}: {reason}")]
    PluginLoad { id: String, reason: String },
    #[error("A debug context is already installed in this process")]
    ContextAlreadyInstalled,
}

pub type DebugViewResult<T> = Result<T, DebugViewError>;
