use crate::platform::{Bounds, NotificationId};
use log::{trace, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

pub type ConfigRef = Rc<Config>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine default config directory")]
    NoConfigDir,
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// The path the config file was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Width in pixels the overlay window is registered with
    pub window_width: u32,
    /// Height in pixels the overlay window is registered with
    pub window_height: u32,
    /// Horizontal position of the overlay window each time it is attached
    pub initial_x: i32,
    /// Vertical position of the overlay window each time it is attached
    pub initial_y: i32,
    /// Notification shown while the overlay service runs in foreground mode
    pub foreground_notification: NotificationText,
    /// Notification used as the entry point when overlays are not permitted
    pub fallback_entry: FallbackEntryConfig,
    /// Plugin ids registered when the application opens its first screen
    pub optional_plugins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NotificationText {
    /// Notification title
    pub title: String,
    /// Notification body
    pub text: String,
}

impl Default for NotificationText {
    fn default() -> Self {
        Self {
            title: "DebugView".to_string(),
            text: "Debug overlay is running".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FallbackEntryConfig {
    /// Id of the low importance channel the entry is posted to
    pub channel_id: String,
    /// User visible name of that channel
    pub channel_name: String,
    /// Notification id; reposting with the same id updates the entry in place
    pub notification_id: NotificationId,
    /// Notification title
    pub title: String,
    /// Notification body
    pub text: String,
}

impl Default for FallbackEntryConfig {
    fn default() -> Self {
        Self {
            channel_id: "debug_entry_channel".to_string(),
            channel_name: "Debug Entry".to_string(),
            notification_id: 22001,
            title: "Debug panel".to_string(),
            text: "Tap to open while the overlay permission is missing".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            window_width: 720,
            window_height: 720,
            initial_x: 0,
            initial_y: 0,
            foreground_notification: NotificationText::default(),
            fallback_entry: FallbackEntryConfig::default(),
            optional_plugins: vec![
                "log_view".to_string(),
                "page_task_top".to_string(),
                "device_info".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn default_config_path() -> Option<PathBuf> {
        crate::paths::default_config_path()
    }

    pub fn load(config_path: Option<&Path>, save: bool) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path().ok_or(ConfigError::NoConfigDir)?,
        };

        if !path.exists() {
            Config::default().save_to_file(&path)?;
            trace!("Created default config file at: {}", path.display());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let mut config: Config =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;

        config.config_path = Some(path.clone());

        // Save the config back to ensure all fields are present
        if save {
            if let Err(e) = config.save_to_file(&path) {
                warn!("Failed to update config file with missing fields: {e}");
            }
        }

        Ok(config)
    }

    /// The bounds a freshly attached overlay window starts from.
    pub fn initial_bounds(&self) -> Bounds {
        Bounds::new(
            self.initial_x,
            self.initial_y,
            self.window_width,
            self.window_height,
        )
    }

    /// Save the config to a file, with each field's documentation as a comment
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = super::config_serializer::serialize_config(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
