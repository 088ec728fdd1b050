use crate::config::FallbackEntryConfig;
use crate::platform::{
    Notification, NotificationAction, NotificationChannel, NotificationId, PlatformImpl,
};
use log::{debug, warn};

/// Notification channels exist from this API level on.
pub const NOTIFICATION_CHANNEL_API_LEVEL: u32 = 26;

/// The notification that opens the debug panel while overlays are not allowed.
#[derive(Debug, Clone)]
pub struct FallbackEntry {
    config: FallbackEntryConfig,
}

impl FallbackEntry {
    pub fn new(config: FallbackEntryConfig) -> Self {
        Self { config }
    }

    pub fn notification_id(&self) -> NotificationId {
        self.config.notification_id
    }

    pub fn channel(&self) -> NotificationChannel {
        NotificationChannel {
            id: self.config.channel_id.clone(),
            name: self.config.channel_name.clone(),
        }
    }

    pub fn notification(&self, api_level: u32) -> Notification {
        let channel_id = (api_level >= NOTIFICATION_CHANNEL_API_LEVEL)
            .then(|| self.config.channel_id.clone());

        Notification {
            channel_id,
            icon: "ic_menu_info_details",
            title: self.config.title.clone(),
            text: self.config.text.clone(),
            auto_cancel: false,
            ongoing: false,
            action: NotificationAction::OpenPanel {
                new_task: true,
                single_top: true,
            },
        }
    }

    /// Posts the entry, replacing any earlier copy. Returns whether it was posted.
    pub fn show(&self, platform: &dyn PlatformImpl) -> bool {
        let Some(manager) = platform.notification_manager() else {
            warn!("Notification service unavailable; skipping debug panel entry");
            return false;
        };

        let api_level = platform.api_level();
        if api_level >= NOTIFICATION_CHANNEL_API_LEVEL {
            if let Err(e) = manager.create_channel(&self.channel()) {
                warn!("Failed to create channel {}: {e}", self.config.channel_id);
            }
        }

        match manager.notify(self.config.notification_id, &self.notification(api_level)) {
            Ok(()) => {
                debug!("Posted debug panel entry {}", self.config.notification_id);
                true
            }
            Err(e) => {
                warn!("Failed to post debug panel entry: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPlatform;

    #[test]
    fn test_entry_defaults() {
        let entry = FallbackEntry::new(FallbackEntryConfig::default());
        let notification = entry.notification(34);

        assert_eq!(entry.notification_id(), 22001);
        assert_eq!(notification.channel_id.as_deref(), Some("debug_entry_channel"));
        assert!(!notification.auto_cancel);
        assert!(!notification.ongoing);
        assert_eq!(
            notification.action,
            NotificationAction::OpenPanel {
                new_task: true,
                single_top: true
            }
        );
        assert_eq!(entry.channel().name, "Debug Entry");
    }

    #[test]
    fn test_show_reposts_in_place() {
        let platform = MockPlatform::new();
        let entry = FallbackEntry::new(FallbackEntryConfig::default());

        assert!(entry.show(&platform));
        assert!(entry.show(&platform));

        assert_eq!(platform.notifications().notify_calls(), 2);
        assert_eq!(platform.notifications().active().len(), 1);
        assert_eq!(platform.notifications().channels().len(), 1);
    }

    #[test]
    fn test_no_channel_before_channels_existed() {
        let platform = MockPlatform::new();
        platform.set_api_level(24);
        let entry = FallbackEntry::new(FallbackEntryConfig::default());

        assert!(entry.show(&platform));

        assert!(platform.notifications().channels().is_empty());
        let (_, notification) = platform.notifications().active().remove(0);
        assert_eq!(notification.channel_id, None);
    }

    #[test]
    fn test_show_without_notification_service() {
        let platform = MockPlatform::new();
        platform.set_notifications_available(false);
        let entry = FallbackEntry::new(FallbackEntryConfig::default());

        assert!(!entry.show(&platform));
        assert_eq!(platform.notifications().notify_calls(), 0);
    }
}
