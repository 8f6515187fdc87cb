//! Application initialization and resource setup.
//!
//! This module provides functions to initialize process-wide resources:
//! - Logger
//! - Crypto provider for TLS
//! - DNS resolver
//!
//! All initialization functions return proper error types for error handling.

mod logger;
mod resolver;

use std::sync::Arc;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. Call this once before
/// any TLS configuration is built; [`crypto_provider`] falls back to the same
/// provider when it was not installed.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}

/// Returns the process-wide crypto provider, or the `ring` provider if none is installed.
pub fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(default_provider()))
}
