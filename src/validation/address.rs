//! `host:port` address validation.

use std::fmt;

use crate::error_handling::ValidationError;

/// A validated `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    /// Host name or IP address (brackets removed for IPv6)
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Splits `raw` into a non-empty host and a non-empty port.
///
/// IPv6 hosts must be bracketed (`[::1]:80`). A missing port and a missing
/// host are reported as distinct failures naming the input. The port must be
/// a number in `0..=65535`; service names are not resolved.
///
/// # Examples
///
/// ```
/// use conndebug::validation::parse_address;
///
/// let addr = parse_address("example.com:80").unwrap();
/// assert_eq!(addr.host, "example.com");
/// assert_eq!(addr.port, 80);
///
/// let err = parse_address("example.com").unwrap_err();
/// assert!(err.to_string().contains("missing port"));
/// ```
pub fn parse_address(raw: &str) -> Result<HostPort, ValidationError> {
    let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| ValidationError::UnclosedBracket {
                address: raw.to_string(),
            })?;
        let host = &rest[..close];
        let after = &rest[close + 1..];
        match after.strip_prefix(':') {
            Some(port) => (host, port),
            None => {
                return Err(ValidationError::MissingPort {
                    address: raw.to_string(),
                })
            }
        }
    } else {
        let (host, port) = raw
            .rsplit_once(':')
            .ok_or_else(|| ValidationError::MissingPort {
                address: raw.to_string(),
            })?;
        if host.contains(':') {
            return Err(ValidationError::TooManyColons {
                address: raw.to_string(),
            });
        }
        (host, port)
    };

    if port.is_empty() {
        return Err(ValidationError::MissingPort {
            address: raw.to_string(),
        });
    }
    if host.is_empty() {
        return Err(ValidationError::MissingHost {
            address: raw.to_string(),
        });
    }

    let port = port
        .parse::<u16>()
        .map_err(|_| ValidationError::InvalidPort {
            address: raw.to_string(),
            port: port.to_string(),
        })?;

    Ok(HostPort {
        host: host.to_string(),
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_host_and_port() {
        let addr = parse_address("example.com:80").unwrap();
        assert_eq!(addr.host, "example.com");
        assert_eq!(addr.port, 80);
        assert_eq!(addr.to_string(), "example.com:80");
    }

    #[test]
    fn test_parse_address_bracketed_ipv6() {
        let addr = parse_address("[::1]:8443").unwrap();
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.port, 8443);
        assert_eq!(addr.to_string(), "[::1]:8443");
    }

    #[test]
    fn test_parse_address_missing_port() {
        for raw in ["example.com", "example.com:", "[::1]", "[::1]:", "10.0.0.1"] {
            let err = parse_address(raw).unwrap_err();
            assert!(
                matches!(err, ValidationError::MissingPort { .. }),
                "{raw} should be missing port, got {err:?}"
            );
            assert!(err.to_string().contains("missing port"));
            assert!(err.to_string().contains(raw));
        }
    }

    #[test]
    fn test_parse_address_missing_host() {
        for raw in [":80", "[]:80"] {
            let err = parse_address(raw).unwrap_err();
            assert!(
                matches!(err, ValidationError::MissingHost { .. }),
                "{raw} should be missing host, got {err:?}"
            );
            assert!(err.to_string().contains("missing host"));
        }
    }

    #[test]
    fn test_parse_address_missing_port_wins_over_missing_host() {
        let err = parse_address(":").unwrap_err();
        assert!(matches!(err, ValidationError::MissingPort { .. }));
    }

    #[test]
    fn test_parse_address_rejects_non_numeric_port() {
        for raw in ["example.com:http", "example.com:65536", "[::1]:-1"] {
            let err = parse_address(raw).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidPort { .. }),
                "{raw} should have an invalid port, got {err:?}"
            );
            assert!(err.to_string().contains(raw));
        }
    }

    #[test]
    fn test_parse_address_unbracketed_ipv6() {
        let err = parse_address("::1:80").unwrap_err();
        assert!(matches!(err, ValidationError::TooManyColons { .. }));
    }

    #[test]
    fn test_parse_address_unclosed_bracket() {
        let err = parse_address("[::1:80").unwrap_err();
        assert!(matches!(err, ValidationError::UnclosedBracket { .. }));
    }
}
