//! Client certificate identity.

use std::fmt;
use std::path::{Path, PathBuf};

use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::error_handling::TlsConfigError;

/// A client certificate chain and its private key.
pub struct ClientIdentity {
    /// Leaf first
    pub chain: Vec<CertificateDer<'static>>,
    /// PKCS#8, PKCS#1 or SEC1 key
    pub key: PrivateKeyDer<'static>,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("chain_len", &self.chain.len())
            .finish_non_exhaustive()
    }
}

fn read_pem(kind: &'static str, path: &Path) -> Result<Vec<u8>, TlsConfigError> {
    std::fs::read(path).map_err(|source| TlsConfigError::ReadMaterial {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn malformed(path: &Path) -> impl FnOnce(std::io::Error) -> TlsConfigError + '_ {
    move |source| TlsConfigError::MalformedPem {
        path: path.to_path_buf(),
        source,
    }
}

impl ClientIdentity {
    /// Loads the chain from `cert_path` and the first private key from `key_path`.
    ///
    /// Whether the two belong together is checked when the TLS configuration
    /// is built.
    pub fn load(cert_path: &Path, key_path: &Path) -> Result<Self, TlsConfigError> {
        let cert_pem = read_pem("client certificate", cert_path)?;
        let chain = rustls_pemfile::certs(&mut cert_pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(malformed(cert_path))?;
        if chain.is_empty() {
            return Err(TlsConfigError::NoClientCertificate {
                path: PathBuf::from(cert_path),
            });
        }

        let key_pem = read_pem("private key", key_path)?;
        let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
            .map_err(malformed(key_path))?
            .ok_or_else(|| TlsConfigError::NoPrivateKey {
                path: PathBuf::from(key_path),
            })?;

        log::debug!(
            "Loaded client identity ({} certificate(s)) from {}",
            chain.len(),
            cert_path.display()
        );
        Ok(Self { chain, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_generated_identity() {
        let generated = rcgen::generate_simple_self_signed(vec!["client".to_string()]).unwrap();
        let cert = write(&generated.cert.pem());
        let key = write(&generated.key_pair.serialize_pem());
        let identity = ClientIdentity::load(cert.path(), key.path()).unwrap();
        assert_eq!(identity.chain.len(), 1);
    }

    #[test]
    fn test_key_file_without_key() {
        let generated = rcgen::generate_simple_self_signed(vec!["client".to_string()]).unwrap();
        let cert = write(&generated.cert.pem());
        let key = write("no key in here\n");
        let err = ClientIdentity::load(cert.path(), key.path()).unwrap_err();
        assert!(matches!(err, TlsConfigError::NoPrivateKey { .. }));
    }

    #[test]
    fn test_cert_file_without_certificate() {
        let generated = rcgen::generate_simple_self_signed(vec!["client".to_string()]).unwrap();
        let cert = write("");
        let key = write(&generated.key_pair.serialize_pem());
        let err = ClientIdentity::load(cert.path(), key.path()).unwrap_err();
        assert!(matches!(err, TlsConfigError::NoClientCertificate { .. }));
    }
}
