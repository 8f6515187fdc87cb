//! Request cookie assembly.
//!
//! Cookies are stored in a [`reqwest::cookie::Jar`] scoped to the target URL,
//! and the `Cookie` header is taken back out of the jar at send time.

use std::fmt;
use std::sync::Arc;

use http::HeaderValue;
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use crate::config::{COOKIE_DELIMITER, COOKIE_PAIR_SEPARATOR};
use crate::error_handling::ValidationError;

/// Cookies that apply to exactly one request URL.
#[derive(Clone)]
pub struct CookieScope {
    jar: Arc<Jar>,
    pairs: Vec<(String, String)>,
}

impl fmt::Debug for CookieScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieScope")
            .field("pairs", &self.pairs)
            .finish()
    }
}

impl CookieScope {
    /// Creates a scope holding no cookies.
    pub fn empty() -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            pairs: Vec::new(),
        }
    }

    /// Parses raw cookie strings and scopes them to `url`.
    ///
    /// Each string may hold several `name=value` pairs separated by `;`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MalformedCookie`] naming the offending input.
    pub fn parse(raw: &[String], url: &Url) -> Result<Self, ValidationError> {
        let jar = Jar::default();
        let mut pairs = Vec::new();

        for input in raw {
            let parsed = parse_cookie_line(input)?;
            for (name, value) in parsed {
                jar.add_cookie_str(&format!("{name}{COOKIE_DELIMITER}{value}"), url);
                log::debug!("Scoped cookie {name} to {url}");
                pairs.push((name, value));
            }
        }

        Ok(Self {
            jar: Arc::new(jar),
            pairs,
        })
    }

    /// Pairs in the order they were supplied.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns true if no cookie was supplied.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The `Cookie` header value the jar yields for `url`, if any.
    pub fn header_for(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

impl Default for CookieScope {
    fn default() -> Self {
        Self::empty()
    }
}

fn malformed(cookie: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::MalformedCookie {
        cookie: cookie.to_string(),
        reason: reason.into(),
    }
}

fn parse_cookie_line(input: &str) -> Result<Vec<(String, String)>, ValidationError> {
    if input.trim().is_empty() {
        return Err(malformed(input, "blank cookie"));
    }

    let mut pairs = Vec::new();
    for part in input.split(COOKIE_PAIR_SEPARATOR) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, value) = part
            .split_once(COOKIE_DELIMITER)
            .ok_or_else(|| malformed(input, format!("{part:?} has no '=' separator")))?;
        let name = name.trim();
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(malformed(input, format!("invalid cookie name {name:?}")));
        }
        let value = value.trim();
        let unquoted = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        if !unquoted.bytes().all(is_cookie_value_byte) {
            return Err(malformed(input, format!("invalid cookie value {value:?}")));
        }
        pairs.push((name.to_string(), unquoted.to_string()));
    }

    if pairs.is_empty() {
        return Err(malformed(input, "no cookie pairs"));
    }
    Ok(pairs)
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
}

fn is_cookie_value_byte(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\'
}
