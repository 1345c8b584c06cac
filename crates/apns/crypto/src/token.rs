//! Provider token signing.

use std::path::Path;

use color_eyre::eyre::WrapErr as _;
use jsonwebtoken::{Algorithm, EncodingKey, Header};

/// Claims carried by a provider authentication token.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TokenClaims {
    /// Team identifier of the issuer.
    pub iss: String,
    /// Issue timestamp, Unix seconds.
    pub iat: i64,
}

/// Provider signing key with its gateway identifiers.
///
/// The key material is loaded once and reused for every token.
#[derive(Clone)]
pub struct SigningKey {
    key: EncodingKey,
    key_id: String,
    team_id: String,
}

impl SigningKey {
    /// Load an EC private key from PEM bytes.
    pub fn from_pem(
        pem: &[u8],
        key_id: impl Into<String>,
        team_id: impl Into<String>,
    ) -> color_eyre::eyre::Result<Self> {
        let key = EncodingKey::from_ec_pem(pem).wrap_err("failed to parse EC private key")?;

        Ok(Self {
            key,
            key_id: key_id.into(),
            team_id: team_id.into(),
        })
    }

    /// Load an EC private key from a PEM file.
    pub fn from_file(
        path: &Path,
        key_id: impl Into<String>,
        team_id: impl Into<String>,
    ) -> color_eyre::eyre::Result<Self> {
        let pem = std::fs::read(path)
            .wrap_err_with(|| format!("failed to read key file {}", path.display()))?;

        Self::from_pem(&pem, key_id, team_id)
    }

    /// Sign an ES256 token issued at the given timestamp.
    ///
    /// The signature carries the key id in the token header; the claims
    /// identify the issuing team.
    pub fn sign_at(&self, issued_at: i64) -> color_eyre::eyre::Result<String> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        let claims = TokenClaims {
            iss: self.team_id.clone(),
            iat: issued_at,
        };

        jsonwebtoken::encode(&header, &claims, &self.key).wrap_err("failed to sign token")
    }

    /// Key identifier tagged onto every signature.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Team identifier used as the token issuer.
    pub fn team_id(&self) -> &str {
        &self.team_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn test_key() -> SigningKey {
        let pem = rcgen::KeyPair::generate().unwrap().serialize_pem();
        SigningKey::from_pem(pem.as_bytes(), "KEY123", "TEAM456").unwrap()
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(segment)
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_sign_produces_three_segments() {
        let token = test_key().sign_at(1_700_000_000).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_token_header_carries_kid() {
        let token = test_key().sign_at(1_700_000_000).unwrap();
        let header = decode_segment(token.split('.').next().unwrap());
        assert_eq!(header["alg"], "ES256");
        assert_eq!(header["kid"], "KEY123");
    }

    #[test]
    fn test_token_claims_carry_issuer_and_timestamp() {
        let token = test_key().sign_at(1_700_000_000).unwrap();
        let claims = decode_segment(token.split('.').nth(1).unwrap());
        assert_eq!(claims["iss"], "TEAM456");
        assert_eq!(claims["iat"], 1_700_000_000_i64);
    }

    #[test]
    fn test_rejects_non_ec_key() {
        assert!(SigningKey::from_pem(b"not a key", "KEY123", "TEAM456").is_err());
    }
}
