//! High-level delivery client.

use std::path::Path;

use apns_core::{NotificationRequest, NotificationResult};

use crate::{
    CertConnectionPool, ConnectionPool, GatewayResponse, KeyConnectionPool, PoolConfig,
};

/// APNs delivery client fronting a connection pool.
pub struct ApnsClient<P> {
    pool: P,
}

impl ApnsClient<CertConnectionPool> {
    /// Client authenticating with a TLS client certificate.
    pub fn with_certificate(
        cert_file: impl AsRef<Path>,
        topic: Option<String>,
        config: PoolConfig,
    ) -> color_eyre::eyre::Result<Self> {
        Ok(Self {
            pool: CertConnectionPool::new(cert_file, topic, config)?,
        })
    }
}

impl ApnsClient<KeyConnectionPool> {
    /// Client authenticating with a signed provider token.
    pub fn with_signing_key(
        key_file: impl AsRef<Path>,
        key_id: impl Into<String>,
        team_id: impl Into<String>,
        topic: impl Into<String>,
        config: PoolConfig,
    ) -> color_eyre::eyre::Result<Self> {
        Ok(Self {
            pool: KeyConnectionPool::new(key_file, key_id, team_id, topic, config)?,
        })
    }
}

impl<P: ConnectionPool> ApnsClient<P> {
    /// Wrap an already constructed pool.
    pub fn from_pool(pool: P) -> Self {
        Self { pool }
    }

    /// Deliver one notification and translate the gateway's verdict.
    ///
    /// Gateway rejections come back as unsuccessful results; only
    /// configuration, serialization, and transport failures are errors.
    pub async fn send(
        &self,
        request: &NotificationRequest,
    ) -> color_eyre::eyre::Result<NotificationResult> {
        let response = self.pool.send_notification(request).await?;
        Ok(translate(&request.notification_id, response))
    }

    /// The pool behind this client.
    pub fn pool(&self) -> &P {
        &self.pool
    }
}

/// Convert a raw exchange into a per-notification result.
///
/// The gateway echoes the notification id in the `apns-id` header; the
/// request id is the fallback when the header is missing or unreadable.
fn translate(notification_id: &str, response: GatewayResponse) -> NotificationResult {
    let notification_id = response
        .headers
        .get("apns-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or(notification_id);

    let description = serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| {
            body.get("reason")
                .and_then(|reason| reason.as_str())
                .map(str::to_string)
        });

    NotificationResult::new(notification_id, response.status.as_str(), description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: http::StatusCode, apns_id: Option<&str>, body: &[u8]) -> GatewayResponse {
        let mut headers = http::HeaderMap::new();
        if let Some(id) = apns_id {
            headers.insert("apns-id", id.parse().unwrap());
        }
        GatewayResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_accepted_response_is_successful() {
        let result = translate(
            "req-id",
            response(http::StatusCode::OK, Some("req-id"), b""),
        );
        assert!(result.is_successful());
        assert_eq!(result.status, "200");
        assert_eq!(result.notification_id, "req-id");
        assert_eq!(result.description, None);
    }

    #[test]
    fn test_rejection_carries_reason() {
        let result = translate(
            "req-id",
            response(
                http::StatusCode::GONE,
                Some("req-id"),
                br#"{"reason": "Unregistered"}"#,
            ),
        );
        assert!(!result.is_successful());
        assert_eq!(result.status, "410");
        assert_eq!(result.description.as_deref(), Some("Unregistered"));
    }

    #[test]
    fn test_missing_echo_falls_back_to_request_id() {
        let result = translate("req-id", response(http::StatusCode::OK, None, b""));
        assert_eq!(result.notification_id, "req-id");
    }

    #[test]
    fn test_non_json_body_yields_no_description() {
        let result = translate(
            "req-id",
            response(http::StatusCode::INTERNAL_SERVER_ERROR, None, b"oops"),
        );
        assert_eq!(result.status, "500");
        assert_eq!(result.description, None);
    }
}
