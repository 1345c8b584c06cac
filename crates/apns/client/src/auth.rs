//! Authorization header production for token-authenticated pools.

use std::sync::Arc;

use apns_crypto::SigningKey;
use parking_lot::RwLock;

/// Token lifetime before a fresh one is signed.
const TOKEN_TTL_SECS: i64 = 30 * 60;

struct IssuedHeader {
    issued_at: i64,
    header: String,
}

/// Produces `authorization` header values from a provider signing key.
///
/// The signed token is cached together with its issue timestamp and reused
/// until it goes stale. A refresh is a pure function of the clock and the
/// immutable key, so concurrent refreshes may race and idempotently
/// overwrite each other; no further mutual exclusion is needed.
pub struct TokenAuthorizer {
    key: Arc<SigningKey>,
    cache: RwLock<Option<IssuedHeader>>,
}

impl TokenAuthorizer {
    /// Create an authorizer around a loaded signing key.
    pub fn new(key: Arc<SigningKey>) -> Self {
        Self {
            key,
            cache: RwLock::new(None),
        }
    }

    /// Current authorization header value, re-signing when stale.
    pub fn header(&self) -> color_eyre::eyre::Result<String> {
        self.header_at(chrono::Utc::now().timestamp())
    }

    /// Header value for a caller-supplied clock.
    pub fn header_at(&self, now: i64) -> color_eyre::eyre::Result<String> {
        if let Some(issued) = self.cache.read().as_ref() {
            if now - issued.issued_at <= TOKEN_TTL_SECS {
                return Ok(issued.header.clone());
            }
        }

        let token = self.key.sign_at(now)?;
        let header = format!("bearer {token}");

        *self.cache.write() = Some(IssuedHeader {
            issued_at: now,
            header: header.clone(),
        });

        Ok(header)
    }
}
