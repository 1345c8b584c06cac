//! TLS client configuration for gateway connections.

use std::sync::Arc;

use color_eyre::eyre::WrapErr as _;
use rustls::ClientConfig;
use rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};

fn root_store() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();

    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            for cert in certs {
                let _ = roots.add(cert);
            }
        }
        Err(err) => {
            tracing::warn!(%err, "failed to load system root certificates");
        }
    }

    roots
}

/// Client TLS configuration without a client identity.
///
/// Used for token-authenticated connections, where the authorization
/// travels in a request header rather than the handshake.
pub fn client_config() -> ClientConfig {
    let mut config = ClientConfig::builder()
        .with_root_certificates(root_store())
        .with_no_client_auth();

    config.alpn_protocols = vec![b"h2".to_vec()];
    config
}

/// Client TLS configuration presenting a certificate identity.
///
/// `contents` is a PEM document holding the certificate chain and its
/// private key. `no_validation` disables server certificate validation
/// entirely; it exists for development against test gateways and must stay
/// off in production.
pub fn client_config_with_identity(
    contents: &[u8],
    no_validation: bool,
) -> color_eyre::eyre::Result<ClientConfig> {
    let chain: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut &contents[..])
        .collect::<Result<_, _>>()
        .wrap_err("failed to read certificate chain")?;

    if chain.is_empty() {
        color_eyre::eyre::bail!("no certificate in identity file");
    }

    let key = rustls_pemfile::private_key(&mut &contents[..])
        .wrap_err("failed to read private key")?
        .ok_or_else(|| color_eyre::eyre::eyre!("no private key in identity file"))?;

    let builder = ClientConfig::builder();
    let mut config = if no_validation {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerification::new()))
            .with_client_auth_cert(chain, key)
            .wrap_err("failed to build TLS identity")?
    } else {
        builder
            .with_root_certificates(root_store())
            .with_client_auth_cert(chain, key)
            .wrap_err("failed to build TLS identity")?
    };

    config.alpn_protocols = vec![b"h2".to_vec()];
    Ok(config)
}

/// Accepts any server certificate. Development only.
#[derive(Debug)]
struct NoVerification(CryptoProvider);

impl NoVerification {
    fn new() -> Self {
        Self(rustls::crypto::aws_lc_rs::default_provider())
    }
}

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_pem() -> String {
        let key = rcgen::KeyPair::generate().unwrap();
        let cert = rcgen::CertificateParams::default().self_signed(&key).unwrap();
        format!("{}{}", cert.pem(), key.serialize_pem())
    }

    #[test]
    fn test_identity_config_negotiates_h2() {
        let config = client_config_with_identity(identity_pem().as_bytes(), false).unwrap();
        assert_eq!(config.alpn_protocols, vec![b"h2".to_vec()]);
    }

    #[test]
    fn test_identity_config_without_validation() {
        assert!(client_config_with_identity(identity_pem().as_bytes(), true).is_ok());
    }

    #[test]
    fn test_identity_requires_private_key() {
        let key = rcgen::KeyPair::generate().unwrap();
        let cert = rcgen::CertificateParams::default().self_signed(&key).unwrap();
        assert!(client_config_with_identity(cert.pem().as_bytes(), false).is_err());
    }

    #[test]
    fn test_identity_requires_certificate() {
        let key = rcgen::KeyPair::generate().unwrap();
        assert!(client_config_with_identity(key.serialize_pem().as_bytes(), false).is_err());
    }

    #[test]
    fn test_bare_config_negotiates_h2() {
        assert_eq!(client_config().alpn_protocols, vec![b"h2".to_vec()]);
    }
}
