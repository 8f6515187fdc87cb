//! Root trust sources.

use std::fmt;
use std::path::{Path, PathBuf};

use rustls::RootCertStore;

use crate::error_handling::TlsConfigError;

/// Supplies the root certificates used to verify servers.
pub trait TrustSource: Send + Sync + fmt::Debug {
    /// Builds the root store.
    fn root_store(&self) -> Result<RootCertStore, TlsConfigError>;
}

/// The platform trust store.
///
/// Falls back to the bundled Mozilla root set when the operating system
/// store yields no usable certificate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrust;

impl TrustSource for SystemTrust {
    fn root_store(&self) -> Result<RootCertStore, TlsConfigError> {
        let native = rustls_native_certs::load_native_certs();
        for e in &native.errors {
            log::debug!("Error loading platform root certificates: {e}");
        }

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        if ignored > 0 {
            log::debug!("Ignored {ignored} unusable platform root certificate(s)");
        }
        if added == 0 {
            log::warn!("No platform root certificates found, using the bundled root set");
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        } else {
            log::debug!("Loaded {added} platform root certificate(s)");
        }
        Ok(roots)
    }
}

/// Certificates read from a PEM file, replacing the platform store.
///
/// Blocks that fail to decode or are rejected as trust anchors are skipped;
/// the file must yield at least one usable certificate.
#[derive(Debug, Clone)]
pub struct PemFileTrust {
    path: PathBuf,
}

impl PemFileTrust {
    /// Creates a source reading `path` when the store is built.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The PEM file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrustSource for PemFileTrust {
    fn root_store(&self) -> Result<RootCertStore, TlsConfigError> {
        let pem = std::fs::read(&self.path).map_err(|source| TlsConfigError::ReadMaterial {
            kind: "root certificates",
            path: self.path.clone(),
            source,
        })?;

        let mut reader = pem.as_slice();
        let certs = rustls_pemfile::certs(&mut reader).filter_map(|cert| match cert {
            Ok(cert) => Some(cert),
            Err(e) => {
                log::warn!("Skipping unreadable PEM block in {}: {e}", self.path.display());
                None
            }
        });

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(certs);
        if ignored > 0 {
            log::warn!(
                "Ignored {ignored} certificate(s) from {} that are not valid trust anchors",
                self.path.display()
            );
        }
        if added == 0 {
            return Err(TlsConfigError::NoRootCertificates {
                path: self.path.clone(),
            });
        }

        log::debug!("Loaded {added} root certificate(s) from {}", self.path.display());
        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pem_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_system_trust_is_not_empty() {
        let roots = SystemTrust.root_store().unwrap();
        assert!(!roots.is_empty());
    }

    #[test]
    fn test_pem_file_with_one_certificate() {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let file = pem_file(&cert.cert.pem());
        let roots = PemFileTrust::new(file.path()).root_store().unwrap();
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_pem_file_skips_garbage_between_certificates() {
        let first = rcgen::generate_simple_self_signed(vec!["a.test".to_string()]).unwrap();
        let second = rcgen::generate_simple_self_signed(vec!["b.test".to_string()]).unwrap();
        let contents = format!(
            "{}\nnot pem at all\n{}",
            first.cert.pem(),
            second.cert.pem()
        );
        let file = pem_file(&contents);
        let roots = PemFileTrust::new(file.path()).root_store().unwrap();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_pem_file_without_certificates() {
        let file = pem_file("this is not a certificate\n");
        let err = PemFileTrust::new(file.path()).root_store().unwrap_err();
        assert!(matches!(err, TlsConfigError::NoRootCertificates { .. }));
        assert!(err
            .to_string()
            .contains("no root certificates were parsed from"));
    }

    #[test]
    fn test_missing_pem_file() {
        let err = PemFileTrust::new("/nonexistent/conndebug/ca.pem")
            .root_store()
            .unwrap_err();
        assert!(matches!(err, TlsConfigError::ReadMaterial { .. }));
    }
}
