//! Connection pool policies.

use std::path::Path;
use std::sync::Arc;

use apns_core::NotificationRequest;
use apns_crypto::SigningKey;
use color_eyre::eyre::WrapErr as _;

use crate::{ApnsConnection, Endpoint, GatewayResponse, TokenAuthorizer};

/// Pool construction knobs shared by both pool policies.
///
/// `max_connections` and `max_connection_attempts` are carried for callers
/// that schedule their own sends; the pool itself opens one ephemeral
/// connection per send and does not enforce them.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Target the sandbox gateway instead of production.
    pub use_sandbox: bool,
    /// Advisory connection bound.
    pub max_connections: usize,
    /// Advisory cap on connection attempts.
    pub max_connection_attempts: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            use_sandbox: false,
            max_connections: 10,
            max_connection_attempts: None,
        }
    }
}

impl PoolConfig {
    /// Select the sandbox or production gateway.
    pub fn with_sandbox(mut self, use_sandbox: bool) -> Self {
        self.use_sandbox = use_sandbox;
        self
    }

    /// Set the advisory connection bound.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the advisory cap on connection attempts.
    pub fn with_max_connection_attempts(mut self, max: usize) -> Self {
        self.max_connection_attempts = Some(max);
        self
    }
}

/// Connection creation and delivery, implemented by the two pool policies.
#[trait_variant::make(Send)]
pub trait ConnectionPool: Send + Sync {
    /// Create a fresh transport connection.
    fn create_connection(&self) -> ApnsConnection;

    /// Deliver one notification over a fresh connection.
    async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> color_eyre::eyre::Result<GatewayResponse>;
}

/// Pool authenticating with a TLS client certificate.
///
/// The certificate identity travels in the handshake, so connections from
/// this pool carry no authorization header.
pub struct CertConnectionPool {
    topic: String,
    endpoint: Endpoint,
    config: PoolConfig,
    tls: Arc<rustls::ClientConfig>,
}

impl CertConnectionPool {
    /// Build a pool from a PEM file holding the certificate chain and its
    /// private key.
    ///
    /// When `topic` is `None` it is derived from the certificate subject
    /// UID; a supplied topic skips certificate parsing entirely.
    pub fn new(
        cert_file: impl AsRef<Path>,
        topic: Option<String>,
        config: PoolConfig,
    ) -> color_eyre::eyre::Result<Self> {
        Self::build(cert_file.as_ref(), topic, config, false)
    }

    /// Like [`CertConnectionPool::new`], but skips server certificate
    /// validation. Development only.
    pub fn new_insecure(
        cert_file: impl AsRef<Path>,
        topic: Option<String>,
        config: PoolConfig,
    ) -> color_eyre::eyre::Result<Self> {
        Self::build(cert_file.as_ref(), topic, config, true)
    }

    fn build(
        cert_file: &Path,
        topic: Option<String>,
        config: PoolConfig,
        no_validation: bool,
    ) -> color_eyre::eyre::Result<Self> {
        let contents = std::fs::read(cert_file)
            .wrap_err_with(|| format!("failed to read certificate file {}", cert_file.display()))?;

        let tls = apns_crypto::client_config_with_identity(&contents, no_validation)?;

        let topic = match topic {
            Some(topic) => topic,
            None => {
                let pem = std::str::from_utf8(&contents)
                    .wrap_err("certificate file is not valid UTF-8")?;
                let der = apns_crypto::parse_pem_cert(pem)?;
                apns_crypto::extract_topic(&der)
                    .wrap_err("failed to derive topic from certificate")?
            }
        };

        let endpoint = Endpoint::from_sandbox_flag(config.use_sandbox);

        tracing::info!(topic = %topic, endpoint = ?endpoint, "certificate pool ready");

        Ok(Self {
            topic,
            endpoint,
            config,
            tls: Arc::new(tls),
        })
    }

    /// Topic every connection from this pool is scoped to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Gateway endpoint fixed at construction.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl ConnectionPool for CertConnectionPool {
    fn create_connection(&self) -> ApnsConnection {
        ApnsConnection::new(self.endpoint, self.topic.clone(), None, Arc::clone(&self.tls))
    }

    async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> color_eyre::eyre::Result<GatewayResponse> {
        self.create_connection().send_notification(request).await
    }
}

/// Pool authenticating with a signed provider token.
pub struct KeyConnectionPool {
    topic: String,
    endpoint: Endpoint,
    config: PoolConfig,
    key: Arc<SigningKey>,
    tls: Arc<rustls::ClientConfig>,
}

impl KeyConnectionPool {
    /// Build a pool from a PEM signing key and its gateway identifiers.
    ///
    /// The topic cannot be derived for token authentication and is
    /// required. The key file is read and validated once.
    pub fn new(
        key_file: impl AsRef<Path>,
        key_id: impl Into<String>,
        team_id: impl Into<String>,
        topic: impl Into<String>,
        config: PoolConfig,
    ) -> color_eyre::eyre::Result<Self> {
        let key = SigningKey::from_file(key_file.as_ref(), key_id, team_id)?;
        let endpoint = Endpoint::from_sandbox_flag(config.use_sandbox);
        let topic = topic.into();

        tracing::info!(topic = %topic, endpoint = ?endpoint, "token pool ready");

        Ok(Self {
            topic,
            endpoint,
            config,
            key: Arc::new(key),
            tls: Arc::new(apns_crypto::client_config()),
        })
    }

    /// Topic every connection from this pool is scoped to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Gateway endpoint fixed at construction.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl ConnectionPool for KeyConnectionPool {
    fn create_connection(&self) -> ApnsConnection {
        let authorizer = TokenAuthorizer::new(Arc::clone(&self.key));
        ApnsConnection::new(
            self.endpoint,
            self.topic.clone(),
            Some(authorizer),
            Arc::clone(&self.tls),
        )
    }

    async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> color_eyre::eyre::Result<GatewayResponse> {
        self.create_connection().send_notification(request).await
    }
}
