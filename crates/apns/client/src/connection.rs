//! One-shot transport connections to the gateway.

use std::sync::Arc;

use apns_core::NotificationRequest;
use bytes::Bytes;
use color_eyre::eyre::WrapErr as _;
use http::{HeaderMap, Request};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::{Endpoint, TokenAuthorizer};

/// Raw gateway response from a single exchange.
#[derive(Debug)]
pub struct GatewayResponse {
    /// HTTP status returned by the gateway.
    pub status: http::StatusCode,
    /// Response headers; `apns-id` echoes the notification id.
    pub headers: HeaderMap,
    /// Response body; carries a JSON `reason` field on rejection.
    pub body: Vec<u8>,
}

/// A secure channel performing exactly one request/response exchange.
///
/// Connections are created per send and never reused. Dropping the
/// connection releases the socket.
pub struct ApnsConnection {
    endpoint: Endpoint,
    topic: String,
    authorizer: Option<TokenAuthorizer>,
    tls: Arc<rustls::ClientConfig>,
}

impl ApnsConnection {
    /// Create a connection bound to an endpoint and topic.
    ///
    /// Certificate-authenticated connections pass no authorizer; the TLS
    /// handshake itself carries the identity.
    pub fn new(
        endpoint: Endpoint,
        topic: impl Into<String>,
        authorizer: Option<TokenAuthorizer>,
        tls: Arc<rustls::ClientConfig>,
    ) -> Self {
        Self {
            endpoint,
            topic: topic.into(),
            authorizer,
            tls,
        }
    }

    /// Send one notification and return the raw gateway response.
    pub async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> color_eyre::eyre::Result<GatewayResponse> {
        let authorization = match &self.authorizer {
            Some(authorizer) => Some(authorizer.header()?),
            None => None,
        };

        let (wire, body) = build_request(
            request,
            self.endpoint,
            &self.topic,
            authorization.as_deref(),
            chrono::Utc::now().timestamp(),
        )?;

        tracing::debug!(
            notification_id = %request.notification_id,
            uri = %wire.uri(),
            headers = ?wire.headers(),
            body_len = body.len(),
            "sending notification"
        );

        self.exchange(wire, body).await
    }

    async fn exchange(
        &self,
        wire: Request<()>,
        body: Vec<u8>,
    ) -> color_eyre::eyre::Result<GatewayResponse> {
        let host = self.endpoint.host();

        let tcp = TcpStream::connect((host, self.endpoint.port()))
            .await
            .wrap_err_with(|| format!("failed to connect to {host}"))?;

        let server_name = rustls::pki_types::ServerName::try_from(host)
            .wrap_err("invalid gateway hostname")?;

        let tls = TlsConnector::from(Arc::clone(&self.tls))
            .connect(server_name, tcp)
            .await
            .wrap_err("TLS handshake failed")?;

        let (send_request, connection) = h2::client::handshake(tls)
            .await
            .wrap_err("HTTP/2 handshake failed")?;

        // The connection future must be polled for the exchange to progress.
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::debug!(%err, "gateway connection closed with error");
            }
        });

        let mut send_request = send_request
            .ready()
            .await
            .wrap_err("gateway connection not ready")?;

        let (response, mut stream) = send_request
            .send_request(wire, false)
            .wrap_err("failed to open stream")?;

        stream
            .send_data(Bytes::from(body), true)
            .wrap_err("failed to send payload")?;

        let response = response.await.wrap_err("failed to read response")?;
        let (parts, mut recv) = response.into_parts();

        let mut body = Vec::new();
        while let Some(chunk) = recv.data().await {
            let chunk = chunk.wrap_err("failed to read response body")?;
            let _ = recv.flow_control().release_capacity(chunk.len());
            body.extend_from_slice(&chunk);
        }

        Ok(GatewayResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

/// Assemble the wire request and encoded payload for a notification.
///
/// Optional headers are attached only when the request carries the
/// corresponding field. The payload is serialized as literal UTF-8.
fn build_request(
    request: &NotificationRequest,
    endpoint: Endpoint,
    topic: &str,
    authorization: Option<&str>,
    now: i64,
) -> color_eyre::eyre::Result<(Request<()>, Vec<u8>)> {
    let uri = format!(
        "https://{}/3/device/{}",
        endpoint.host(),
        request.device_token
    );

    let mut builder = Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header("apns-id", request.notification_id.as_str())
        .header("apns-topic", topic);

    if let Some(ttl) = request.time_to_live {
        let expiration = now + ttl as i64;
        builder = builder.header("apns-expiration", expiration.to_string());
    }
    if let Some(priority) = request.priority {
        builder = builder.header("apns-priority", priority.as_str());
    }
    if let Some(ref collapse_key) = request.collapse_key {
        builder = builder.header("apns-collapse-id", collapse_key.as_str());
    }
    if let Some(push_type) = request.push_type {
        builder = builder.header("apns-push-type", push_type.as_str());
    }
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }

    let body = serde_json::to_vec(&request.message).wrap_err("failed to serialize payload")?;

    let wire = builder.body(()).wrap_err("failed to build request")?;

    Ok((wire, body))
}
