//! Certificate utilities.

use color_eyre::eyre::WrapErr as _;
use x509_parser::prelude::*;

/// OID of the subject UID attribute.
const UID_OID: &str = "0.9.2342.19200300.100.1.1";

/// Extract the push topic from a provider certificate.
///
/// The topic is stored in the UID attribute of the certificate subject.
pub fn extract_topic(cert_der: &[u8]) -> color_eyre::eyre::Result<String> {
    let (_, cert) =
        X509Certificate::from_der(cert_der).wrap_err("failed to parse certificate DER")?;

    for rdn in cert.subject().iter() {
        for attr in rdn.iter() {
            if attr.attr_type().to_id_string() == UID_OID {
                if let Ok(value) = attr.attr_value().as_str() {
                    return Ok(value.to_string());
                }
            }
        }
    }

    color_eyre::eyre::bail!("no subject UID in certificate")
}

/// Decode the certificate from a PEM document to DER.
///
/// The document may carry additional blocks (a private key alongside the
/// certificate); the first CERTIFICATE block wins.
pub fn parse_pem_cert(pem_str: &str) -> color_eyre::eyre::Result<Vec<u8>> {
    let blocks = ::pem::parse_many(pem_str)
        .map_err(|e| color_eyre::eyre::eyre!("failed to parse PEM: {}", e))?;

    let cert = blocks
        .into_iter()
        .find(|block| block.tag() == "CERTIFICATE")
        .ok_or_else(|| color_eyre::eyre::eyre!("no CERTIFICATE block in PEM document"))?;

    Ok(cert.into_contents())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert_with_uid(uid: &str) -> rcgen::Certificate {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::default();
        params.distinguished_name.push(
            rcgen::DnType::CustomDnType(vec![0, 9, 2342, 19200300, 100, 1, 1]),
            uid,
        );
        params.self_signed(&key).unwrap()
    }

    #[test]
    fn test_extract_topic_from_subject_uid() {
        let cert = cert_with_uid("com.example.notify");
        let topic = extract_topic(cert.der().as_ref()).unwrap();
        assert_eq!(topic, "com.example.notify");
    }

    #[test]
    fn test_extract_topic_missing_uid() {
        let key = rcgen::KeyPair::generate().unwrap();
        let cert = rcgen::CertificateParams::default().self_signed(&key).unwrap();
        assert!(extract_topic(cert.der().as_ref()).is_err());
    }

    #[test]
    fn test_parse_pem_cert_roundtrip() {
        let cert = cert_with_uid("com.example.notify");
        let der = parse_pem_cert(&cert.pem()).unwrap();
        assert_eq!(der, cert.der().as_ref());
    }

    #[test]
    fn test_parse_pem_cert_skips_key_block() {
        let key = rcgen::KeyPair::generate().unwrap();
        let cert = cert_with_uid("com.example.notify");
        let combined = format!("{}{}", key.serialize_pem(), cert.pem());
        let der = parse_pem_cert(&combined).unwrap();
        assert_eq!(der, cert.der().as_ref());
    }

    #[test]
    fn test_parse_pem_cert_rejects_key_only() {
        let key = rcgen::KeyPair::generate().unwrap();
        assert!(parse_pem_cert(&key.serialize_pem()).is_err());
    }
}
