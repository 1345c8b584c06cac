//! Notification request types.

/// Delivery priority, sent in the `apns-priority` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Priority {
    /// Deliver at a time that conserves power on the device.
    #[serde(rename = "5")]
    Normal,
    /// Deliver immediately.
    #[serde(rename = "10")]
    High,
}

impl Priority {
    /// Wire value of this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "5",
            Priority::High => "10",
        }
    }
}

/// Notification classification, sent in the `apns-push-type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushType {
    /// User-visible alert.
    Alert,
    /// Silent background refresh.
    Background,
    /// Incoming VoIP call.
    Voip,
    /// Watch complication update.
    Complication,
    /// File provider update.
    FileProvider,
    /// Device management command.
    Mdm,
}

impl PushType {
    /// Wire value of this push type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PushType::Alert => "alert",
            PushType::Background => "background",
            PushType::Voip => "voip",
            PushType::Complication => "complication",
            PushType::FileProvider => "fileprovider",
            PushType::Mdm => "mdm",
        }
    }
}

/// A single notification addressed to one device.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NotificationRequest {
    /// Opaque device token addressing the recipient.
    pub device_token: String,

    /// JSON payload delivered to the device.
    pub message: serde_json::Value,

    /// Unique notification id, echoed back by the gateway.
    pub notification_id: String,

    /// Relative lifetime in seconds. The gateway discards the notification
    /// once the lifetime elapses.
    pub time_to_live: Option<u64>,

    /// Delivery priority.
    pub priority: Option<Priority>,

    /// Groups notifications so a newer one replaces undelivered older ones.
    pub collapse_key: Option<String>,

    /// Notification classification.
    pub push_type: Option<PushType>,
}

impl NotificationRequest {
    /// Create a request with a freshly generated notification id.
    pub fn new(device_token: impl Into<String>, message: serde_json::Value) -> Self {
        Self {
            device_token: device_token.into(),
            message,
            notification_id: uuid::Uuid::new_v4().to_string(),
            time_to_live: None,
            priority: None,
            collapse_key: None,
            push_type: None,
        }
    }

    /// Use a caller-supplied notification id instead of a generated one.
    pub fn with_notification_id(mut self, id: impl Into<String>) -> Self {
        self.notification_id = id.into();
        self
    }

    /// Set the relative lifetime in seconds.
    pub fn with_time_to_live(mut self, seconds: u64) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    /// Set the delivery priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the collapse key.
    pub fn with_collapse_key(mut self, key: impl Into<String>) -> Self {
        self.collapse_key = Some(key.into());
        self
    }

    /// Set the push type.
    pub fn with_push_type(mut self, push_type: PushType) -> Self {
        self.push_type = Some(push_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_uuid() {
        let request = NotificationRequest::new("abc123", serde_json::json!({}));
        assert!(uuid::Uuid::parse_str(&request.notification_id).is_ok());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = NotificationRequest::new("abc123", serde_json::json!({}));
        let b = NotificationRequest::new("abc123", serde_json::json!({}));
        assert_ne!(a.notification_id, b.notification_id);
    }

    #[test]
    fn test_explicit_id_preserved() {
        let request = NotificationRequest::new("abc123", serde_json::json!({}))
            .with_notification_id("my-id");
        assert_eq!(request.notification_id, "my-id");
    }

    #[test]
    fn test_priority_wire_values() {
        assert_eq!(Priority::Normal.as_str(), "5");
        assert_eq!(Priority::High.as_str(), "10");
    }

    #[test]
    fn test_push_type_wire_values() {
        assert_eq!(PushType::Alert.as_str(), "alert");
        assert_eq!(PushType::Background.as_str(), "background");
        assert_eq!(PushType::Voip.as_str(), "voip");
        assert_eq!(PushType::Complication.as_str(), "complication");
        assert_eq!(PushType::FileProvider.as_str(), "fileprovider");
        assert_eq!(PushType::Mdm.as_str(), "mdm");
    }

    #[test]
    fn test_builder_sets_optional_fields() {
        let request = NotificationRequest::new("abc123", serde_json::json!({}))
            .with_time_to_live(60)
            .with_priority(Priority::High)
            .with_collapse_key("thread-1")
            .with_push_type(PushType::Background);

        assert_eq!(request.time_to_live, Some(60));
        assert_eq!(request.priority, Some(Priority::High));
        assert_eq!(request.collapse_key.as_deref(), Some("thread-1"));
        assert_eq!(request.push_type, Some(PushType::Background));
    }
}
