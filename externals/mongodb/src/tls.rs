//! Build TLS material from CA and client certificates.
//!
//! PEM values can be given inline or as paths to files holding them.
//! Anything starting with `-----BEGIN` is treated as inline content.
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use anyhow::Result;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::PrivateKeyDer;
use rustls::sign::CertifiedKey;
use rustls::InconsistentKeys;
use rustls::RootCertStore;
use tempfile::NamedTempFile;

use principals_context::Context;

use crate::errors::CertificateParseError;
use crate::errors::KeyPairError;

/// Marker identifying inline PEM content.
const PEM_MARKER: &str = "-----BEGIN";

/// Transport security material for connections to the cluster.
pub struct TlsMaterial {
    /// Certificate authorities to verify the cluster with, system roots if not set.
    pub ca: Option<CaBundle>,

    /// Client certificate to present to the cluster, if requested.
    pub client_certificate: Option<ClientCertificateProvider>,
}

impl TlsMaterial {
    /// Write the material to files the MongoDB driver can load.
    ///
    /// The files are deleted once the returned [`TlsFiles`] is dropped.
    pub fn write_files(&self) -> Result<TlsFiles> {
        let ca = match &self.ca {
            Some(ca) => Some(write_pem(&ca.pem)?),
            None => None,
        };
        let client_certificate = match &self.client_certificate {
            Some(provider) => Some(write_pem(&provider.certificate().pem)?),
            None => None,
        };
        Ok(TlsFiles {
            ca,
            client_certificate,
        })
    }
}

/// Trusted certificate authorities parsed from a PEM bundle.
pub struct CaBundle {
    /// The PEM bundle as provided.
    pem: Vec<u8>,

    /// Certificates parsed from the PEM bundle.
    pub roots: RootCertStore,
}

/// A client certificate chain with its private key.
pub struct ClientKeyPair {
    /// Client certificate chain, leaf first.
    pub certificates: Vec<CertificateDer<'static>>,

    /// Private key matching the leaf certificate.
    pub key: PrivateKeyDer<'static>,

    /// Certificate chain and key as combined PEM.
    pem: Vec<u8>,
}

/// Provide the client certificate when a TLS handshake requests one.
#[derive(Clone)]
pub struct ClientCertificateProvider(Arc<dyn Fn() -> Arc<ClientKeyPair> + Send + Sync>);

impl ClientCertificateProvider {
    /// Provider always returning the same, already loaded, key pair.
    pub fn loaded(pair: ClientKeyPair) -> ClientCertificateProvider {
        let pair = Arc::new(pair);
        ClientCertificateProvider(Arc::new(move || Arc::clone(&pair)))
    }

    /// Return the certificate to present for a handshake.
    pub fn certificate(&self) -> Arc<ClientKeyPair> {
        (self.0)()
    }
}

/// Temporary files holding TLS material for the MongoDB driver.
pub struct TlsFiles {
    ca: Option<NamedTempFile>,
    client_certificate: Option<NamedTempFile>,
}

impl TlsFiles {
    /// Path to the CA bundle file, if any.
    pub fn ca_path(&self) -> Option<&Path> {
        self.ca.as_ref().map(NamedTempFile::path)
    }

    /// Path to the combined client certificate and key file, if any.
    pub fn client_certificate_path(&self) -> Option<&Path> {
        self.client_certificate.as_ref().map(NamedTempFile::path)
    }
}

/// Build [`TlsMaterial`] from optional CA and client certificates.
///
/// When `client_key` is not set the key is loaded from `client_certificate`,
/// which supports combined PEM files.
pub fn build(
    context: &Context,
    ca_certificate: Option<&str>,
    client_certificate: Option<&str>,
    client_key: Option<&str>,
) -> Result<Option<TlsMaterial>> {
    let ca_certificate = ca_certificate.filter(|value| !value.is_empty());
    let client_certificate = client_certificate.filter(|value| !value.is_empty());
    if ca_certificate.is_none() && client_certificate.is_none() {
        return Ok(None);
    }

    let ca = match ca_certificate {
        Some(pem) => Some(parse_ca(pem.as_bytes())?),
        None => None,
    };
    if let Some(ca) = &ca {
        slog::debug!(context.logger, "Loaded CA certificates"; "count" => ca.roots.len());
    }

    let client_certificate = match client_certificate {
        None => None,
        Some(certificate) => {
            let key = client_key
                .filter(|value| !value.is_empty())
                .unwrap_or(certificate);
            let pair = load_key_pair(certificate, key)?;
            slog::debug!(
                context.logger, "Loaded client certificate";
                "chain" => pair.certificates.len()
            );
            Some(ClientCertificateProvider::loaded(pair))
        }
    };

    Ok(Some(TlsMaterial {
        ca,
        client_certificate,
    }))
}

/// Parse a PEM bundle of CA certificates.
fn parse_ca(pem: &[u8]) -> Result<CaBundle> {
    let certificates = rustls_pemfile::certs(&mut &pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .context(CertificateParseError)?;
    let mut roots = RootCertStore::empty();
    let (added, _) = roots.add_parsable_certificates(certificates);
    if added == 0 {
        anyhow::bail!(CertificateParseError);
    }
    Ok(CaBundle {
        pem: pem.to_vec(),
        roots,
    })
}

/// Load a client certificate chain and its private key.
fn load_key_pair(certificate: &str, key: &str) -> Result<ClientKeyPair> {
    let certificate = PemSource::detect(certificate);
    let key = PemSource::detect(key);
    let certificate_pem = certificate.read()?;
    let key_pem = if key == certificate {
        None
    } else {
        Some(key.read()?)
    };

    let certificates = rustls_pemfile::certs(&mut certificate_pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| KeyPairError::NoCertificate(certificate.describe()))?;
    if certificates.is_empty() {
        anyhow::bail!(KeyPairError::NoCertificate(certificate.describe()));
    }

    let key_bytes = key_pem.as_deref().unwrap_or(&certificate_pem);
    let private_key = rustls_pemfile::private_key(&mut &key_bytes[..])
        .with_context(|| KeyPairError::NoPrivateKey(key.describe()))?
        .ok_or_else(|| KeyPairError::NoPrivateKey(key.describe()))?;
    let signing_key = rustls::crypto::ring::sign::any_supported_type(&private_key)
        .with_context(|| KeyPairError::UnsupportedKey(key.describe()))?;

    // Keys that can't report their public half are accepted and left to the handshake.
    match CertifiedKey::new(certificates.clone(), signing_key).keys_match() {
        Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => (),
        Err(error) => {
            let kind = KeyPairError::Mismatch(key.describe());
            return Err(anyhow::Error::from(error).context(kind));
        }
    }

    let mut pem = certificate_pem;
    if let Some(key_pem) = key_pem {
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend(key_pem);
    }
    Ok(ClientKeyPair {
        certificates,
        key: private_key,
        pem,
    })
}

/// Write PEM content to a new temporary file.
fn write_pem(pem: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(pem)?;
    file.flush()?;
    Ok(file)
}

/// Where PEM content is loaded from.
#[derive(Debug, Eq, PartialEq)]
enum PemSource<'a> {
    Inline(&'a str),
    Path(&'a str),
}

impl<'a> PemSource<'a> {
    fn detect(value: &'a str) -> PemSource<'a> {
        if value.trim_start().starts_with(PEM_MARKER) {
            PemSource::Inline(value)
        } else {
            PemSource::Path(value)
        }
    }

    /// Human readable description of the source, never including the content.
    fn describe(&self) -> String {
        match self {
            PemSource::Inline(_) => "inline PEM".to_string(),
            PemSource::Path(path) => format!("file '{}'", path),
        }
    }

    fn read(&self) -> Result<Vec<u8>> {
        match self {
            PemSource::Inline(pem) => Ok(pem.as_bytes().to_vec()),
            PemSource::Path(path) => {
                std::fs::read(path).with_context(|| KeyPairError::Read(self.describe()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use principals_context::Context;

    use super::build;
    use crate::errors::CertificateParseError;
    use crate::errors::KeyPairError;

    const CA: &str = include_str!("../fixtures/ca.pem");
    const CLIENT_CERT: &str = include_str!("../fixtures/client.pem");
    const CLIENT_KEY: &str = include_str!("../fixtures/client.key");
    const CLIENT_COMBINED: &str = include_str!("../fixtures/client-combined.pem");
    const OTHER_KEY: &str = include_str!("../fixtures/other.key");
    const NOT_PEM: &str =
        "-----BEGIN CERTIFICATE-----\nthis is not base64 data\n-----END CERTIFICATE-----\n";

    fn fixture_path(name: &str) -> String {
        format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn no_material() {
        let context = Context::fixture();
        let material = build(&context, None, None, None).expect("build to succeed");
        assert!(material.is_none());
        let material = build(&context, Some(""), Some(""), None).unwrap();
        assert!(material.is_none());
    }

    #[test]
    fn ca_only() {
        let context = Context::fixture();
        let material = build(&context, Some(CA), None, None)
            .expect("build to succeed")
            .expect("material to be present");
        let ca = material.ca.expect("CA to be loaded");
        assert_eq!(ca.roots.len(), 1);
        assert!(material.client_certificate.is_none());
    }

    #[test]
    fn ca_malformed() {
        let context = Context::fixture();
        for pem in ["not a certificate", NOT_PEM] {
            let error = match build(&context, Some(pem), None, None) {
                Ok(_) => panic!("build did not fail"),
                Err(error) => error,
            };
            assert!(error.is::<CertificateParseError>());
        }
    }

    #[test]
    fn client_certificate_with_separate_key() {
        let context = Context::fixture();
        let material = build(&context, None, Some(CLIENT_CERT), Some(CLIENT_KEY))
            .unwrap()
            .expect("material to be present");
        assert!(material.ca.is_none());
        let provider = material.client_certificate.expect("client certificate");
        let pair = provider.certificate();
        assert_eq!(pair.certificates.len(), 1);
    }

    #[test]
    fn client_key_must_match_certificate() {
        let context = Context::fixture();
        let error = match build(&context, None, Some(CLIENT_CERT), Some(OTHER_KEY)) {
            Ok(_) => panic!("build did not fail"),
            Err(error) => error,
        };
        assert!(matches!(
            error.downcast_ref::<KeyPairError>(),
            Some(KeyPairError::Mismatch(_))
        ));
    }

    #[test]
    fn client_certificate_combined_pem() {
        let context = Context::fixture();
        let material = build(&context, Some(CA), Some(CLIENT_COMBINED), None)
            .unwrap()
            .expect("material to be present");
        assert!(material.ca.is_some());
        assert!(material.client_certificate.is_some());
    }

    #[test]
    fn client_certificate_from_files() {
        let context = Context::fixture();
        let certificate = fixture_path("client.pem");
        let key = fixture_path("client.key");
        let material = build(&context, None, Some(&certificate), Some(&key))
            .unwrap()
            .expect("material to be present");
        assert!(material.client_certificate.is_some());
    }

    #[test]
    fn client_certificate_missing_file() {
        let context = Context::fixture();
        let error = match build(&context, None, Some("/does/not/exist.pem"), None) {
            Ok(_) => panic!("build did not fail"),
            Err(error) => error,
        };
        assert!(matches!(
            error.downcast_ref::<KeyPairError>(),
            Some(KeyPairError::Read(_))
        ));
    }

    #[test]
    fn client_certificate_without_key() {
        let context = Context::fixture();
        let error = match build(&context, None, Some(CLIENT_CERT), None) {
            Ok(_) => panic!("build did not fail"),
            Err(error) => error,
        };
        assert!(matches!(
            error.downcast_ref::<KeyPairError>(),
            Some(KeyPairError::NoPrivateKey(_))
        ));
    }

    #[test]
    fn missing_key_reuses_certificate_value() {
        let context = Context::fixture();
        let implicit = match build(&context, None, Some(NOT_PEM), None) {
            Ok(_) => panic!("build did not fail"),
            Err(error) => error,
        };
        let explicit = match build(&context, None, Some(NOT_PEM), Some(NOT_PEM)) {
            Ok(_) => panic!("build did not fail"),
            Err(error) => error,
        };
        assert!(implicit.is::<KeyPairError>());
        assert_eq!(implicit.to_string(), explicit.to_string());
    }

    #[test]
    fn provider_returns_same_pair() {
        let context = Context::fixture();
        let material = build(&context, None, Some(CLIENT_COMBINED), None)
            .unwrap()
            .expect("material to be present");
        let provider = material.client_certificate.expect("client certificate");
        let first = provider.certificate();
        let second = provider.certificate();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn files_hold_material() {
        let context = Context::fixture();
        let material = build(&context, Some(CA), Some(CLIENT_CERT), Some(CLIENT_KEY))
            .unwrap()
            .expect("material to be present");
        let files = material.write_files().expect("files to be written");
        let ca = std::fs::read_to_string(files.ca_path().unwrap()).unwrap();
        assert_eq!(ca, CA);
        let combined = std::fs::read_to_string(files.client_certificate_path().unwrap()).unwrap();
        assert!(combined.contains("BEGIN CERTIFICATE"));
        assert!(combined.contains("BEGIN PRIVATE KEY"));
    }
}
