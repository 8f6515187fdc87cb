//! TLS trust and identity.
//!
//! This module turns [`TlsOptions`] into a ready-to-use rustls client
//! configuration:
//! - Root trust from the platform store or a PEM file ([`TrustSource`])
//! - An optional client certificate identity
//! - An optional server-name override used for both SNI and verification
//! - The `--insecure` verifier
//!
//! It also renders peer certificates as text for the response inspector.

mod danger;
mod extract;
mod identity;
mod trust;

use std::net::IpAddr;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use tokio_rustls::TlsConnector;
use url::Host;

use crate::config::{TlsOptions, ALPN_HTTP1};
use crate::error_handling::{FetchError, TlsConfigError};
use crate::initialization::crypto_provider;

pub use extract::{certificate_short_text, certificate_text};
pub use identity::ClientIdentity;
pub use trust::{PemFileTrust, SystemTrust, TrustSource};

/// Name presented to the server during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedName {
    /// Name used for SNI and certificate verification
    pub name: ServerName<'static>,
    /// Printable form
    pub display: String,
}

/// A built TLS client configuration plus the server-name override.
#[derive(Debug, Clone)]
pub struct TlsSettings {
    config: Arc<ClientConfig>,
    server_name: Option<PresentedName>,
}

impl TlsSettings {
    /// The rustls configuration.
    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    /// A connector sharing this configuration.
    pub fn connector(&self) -> TlsConnector {
        TlsConnector::from(Arc::clone(&self.config))
    }

    /// The name to present when connecting to `host`.
    ///
    /// The override wins when set; otherwise the URL host is used, with IP
    /// literals presented as IP addresses.
    pub fn server_name_for(&self, host: &Host<&str>) -> Result<PresentedName, FetchError> {
        if let Some(name) = &self.server_name {
            return Ok(name.clone());
        }
        match host {
            Host::Domain(domain) => ServerName::try_from(domain.to_string())
                .map(|name| PresentedName {
                    name,
                    display: domain.to_string(),
                })
                .map_err(|_| FetchError::InvalidServerName(domain.to_string())),
            Host::Ipv4(ip) => Ok(ip_name(IpAddr::V4(*ip))),
            Host::Ipv6(ip) => Ok(ip_name(IpAddr::V6(*ip))),
        }
    }
}

fn ip_name(ip: IpAddr) -> PresentedName {
    PresentedName {
        name: ServerName::IpAddress(ip.into()),
        display: ip.to_string(),
    }
}

/// Builds TLS settings, trusting the platform roots unless `root_cert` is set.
///
/// All PEM material is read here, so a bad file fails before any network I/O.
///
/// # Errors
///
/// Returns a [`TlsConfigError`] if trust or identity material cannot be loaded
/// or the server-name override is not a valid name.
pub fn build_tls_settings(options: &TlsOptions) -> Result<TlsSettings, TlsConfigError> {
    match &options.root_cert {
        Some(path) => build_tls_settings_with(options, &PemFileTrust::new(path)),
        None => build_tls_settings_with(options, &SystemTrust),
    }
}

/// Builds TLS settings with an explicit trust source.
pub fn build_tls_settings_with(
    options: &TlsOptions,
    trust: &dyn TrustSource,
) -> Result<TlsSettings, TlsConfigError> {
    let server_name = options
        .server_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(|name| {
            ServerName::try_from(name.to_string())
                .map(|parsed| PresentedName {
                    name: parsed,
                    display: name.to_string(),
                })
                .map_err(|_| TlsConfigError::InvalidServerName(name.to_string()))
        })
        .transpose()?;

    let roots = trust.root_store()?;

    let identity = match (&options.client_cert, &options.client_key) {
        (Some(cert), Some(key)) => Some(ClientIdentity::load(cert, key)?),
        _ => None,
    };

    let provider = crypto_provider();
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(TlsConfigError::Rustls)?;

    let builder = if options.insecure {
        log::warn!("TLS certificate verification is disabled (--insecure)");
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(danger::NoVerify::new(provider)))
    } else {
        builder.with_root_certificates(roots)
    };

    let mut config = match identity {
        Some(identity) => builder
            .with_client_auth_cert(identity.chain, identity.key)
            .map_err(TlsConfigError::InvalidKeyPair)?,
        None => builder.with_no_client_auth(),
    };
    config.alpn_protocols = vec![ALPN_HTTP1.to_vec()];

    Ok(TlsSettings {
        config: Arc::new(config),
        server_name,
    })
}
