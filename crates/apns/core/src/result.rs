//! Per-notification delivery results.

/// Gateway status codes, preserved verbatim as strings.
pub mod status {
    /// Notification accepted.
    pub const SUCCESS: &str = "200";
    /// Malformed request.
    pub const BAD_REQUEST: &str = "400";
    /// Authentication error.
    pub const FORBIDDEN: &str = "403";
    /// Wrong HTTP method.
    pub const METHOD_NOT_ALLOWED: &str = "405";
    /// Device token is no longer valid for the topic.
    pub const GONE: &str = "410";
    /// Payload exceeds the gateway limit.
    pub const PAYLOAD_TOO_LARGE: &str = "413";
    /// Rate limited.
    pub const TOO_MANY_REQUESTS: &str = "429";
    /// Gateway-side failure.
    pub const INTERNAL_SERVER_ERROR: &str = "500";
    /// Gateway unavailable.
    pub const SERVICE_UNAVAILABLE: &str = "503";
}

/// Outcome of one notification delivery attempt.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NotificationResult {
    /// Id of the originating request.
    pub notification_id: String,
    /// Gateway status code, verbatim.
    pub status: String,
    /// Rejection reason, when the gateway supplied one.
    pub description: Option<String>,
}

impl NotificationResult {
    /// Create a result for a notification id.
    pub fn new(
        notification_id: impl Into<String>,
        status: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            notification_id: notification_id.into(),
            status: status.into(),
            description,
        }
    }

    /// Whether the gateway accepted the notification.
    pub fn is_successful(&self) -> bool {
        self.status == status::SUCCESS
    }
}
