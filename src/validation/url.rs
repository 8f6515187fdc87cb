//! Target URL validation.

use url::Url;

use crate::error_handling::ValidationError;

/// Parses `raw` as a URL whose scheme is exactly `http` or `https`.
///
/// An input without a scheme (`example.com`) is reported as a missing scheme
/// and any other scheme as unsupported; both errors carry the input verbatim.
///
/// # Examples
///
/// ```
/// use conndebug::validation::parse_target_url;
///
/// assert!(parse_target_url("https://example.com").is_ok());
/// assert!(parse_target_url("example.com")
///     .unwrap_err()
///     .to_string()
///     .contains("missing scheme"));
/// ```
pub fn parse_target_url(raw: &str) -> Result<Url, ValidationError> {
    match Url::parse(raw) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ValidationError::UnsupportedScheme {
                scheme: scheme.to_string(),
                input: raw.to_string(),
            }),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => Err(ValidationError::MissingScheme {
            input: raw.to_string(),
        }),
        Err(source) => Err(ValidationError::InvalidUrl {
            input: raw.to_string(),
            source,
        }),
    }
}
