//! DNS resolver initialization.
//!
//! This module provides functions to initialize the DNS resolver with proper
//! timeout configuration.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes the DNS resolver for hostname lookups.
///
/// Reads the system resolver configuration (`/etc/resolv.conf`, hosts file)
/// and falls back to the default public resolvers if it cannot be read. Query
/// timeouts are bounded so a dead name server cannot stall a request that has
/// no deadline of its own.
///
/// # Errors
///
/// Reserved: both configurations currently always produce a resolver, but
/// callers treat resolver setup as fallible.
pub fn init_resolver() -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, opts)) if !config.name_servers().is_empty() => (config, opts),
        Ok(_) => {
            log::debug!("System resolver configuration has no name servers, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
        Err(e) => {
            log::debug!("Falling back to default resolver configuration: {e}");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };

    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // Dual-stack answers are wanted so connect attempts can fall back across families
    opts.ip_strategy = hickory_resolver::config::LookupIpStrategy::Ipv4AndIpv6;

    Ok(Arc::new(TokioAsyncResolver::tokio(config, opts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_resolver_succeeds() {
        let resolver = init_resolver();
        assert!(resolver.is_ok(), "resolver should initialize: {:?}", resolver.err());
    }

    #[tokio::test]
    async fn test_resolver_returns_ip_literals_without_query() {
        let resolver = init_resolver().expect("resolver should initialize");
        let lookup = resolver
            .lookup_ip("127.0.0.1")
            .await
            .expect("IP literal lookup should not hit the network");
        let addrs: Vec<_> = lookup.iter().collect();
        assert_eq!(addrs, vec!["127.0.0.1".parse::<std::net::IpAddr>().unwrap()]);
    }
}
