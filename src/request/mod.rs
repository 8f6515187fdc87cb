//! Validated request descriptions.
//!
//! A [`RequestSpec`] is built once from raw [`HttpOptions`] and is immutable
//! afterwards; the executor only reads it.

mod body;
mod cookies;
mod headers;

use std::time::Duration;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use url::Url;

use crate::config::HttpOptions;
use crate::error_handling::ValidationError;
use crate::validation::parse_target_url;

pub use body::{BodySource, RequestBody};
pub use cookies::CookieScope;
pub use headers::{parse_headers, HeaderEntry, HeaderSet};

/// HTTP methods the engine will send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Parses a method name case-insensitively.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnsupportedMethod`] with the upper-cased input.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        raw.trim()
            .parse()
            .map_err(|_| ValidationError::UnsupportedMethod(raw.trim().to_ascii_uppercase()))
    }

    /// The wire method.
    pub fn as_http(&self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

/// A fully validated request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Absolute `http`/`https` URL
    pub url: Url,
    /// Method to send
    pub method: HttpMethod,
    /// Headers as supplied, plus a default `Content-Type` when a body is set
    pub headers: HeaderSet,
    /// Cookies scoped to `url`
    pub cookies: CookieScope,
    /// Body source
    pub body: BodySource,
    /// Overall deadline; `None` means unbounded
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    /// A bodiless `GET` with no headers, cookies or deadline.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: HeaderSet::new(),
            cookies: CookieScope::empty(),
            body: BodySource::Empty,
            timeout: None,
        }
    }

    /// Validates raw options into a request.
    ///
    /// Flag conflicts are checked first, then the URL, method, headers and
    /// cookies. No file is opened and no network I/O happens here.
    ///
    /// # Examples
    ///
    /// ```
    /// use conndebug::request::{HttpMethod, RequestSpec};
    /// use conndebug::HttpOptions;
    ///
    /// let options = HttpOptions {
    ///     url: "http://127.0.0.1:8080/submit".to_string(),
    ///     method: "post".to_string(),
    ///     data: Some("hello".to_string()),
    ///     ..Default::default()
    /// };
    /// let spec = RequestSpec::from_options(&options).unwrap();
    /// assert_eq!(spec.method, HttpMethod::Post);
    /// assert_eq!(spec.headers.get("content-type"), Some("text/plain"));
    /// ```
    pub fn from_options(options: &HttpOptions) -> Result<Self, ValidationError> {
        options.check_preconditions()?;

        let url = parse_target_url(&options.url)?;
        let method = HttpMethod::parse(&options.method)?;
        let body = BodySource::from_flags(options.data.as_deref(), options.data_file.as_deref());
        let headers = parse_headers(&options.headers, body.has_body())?;
        let cookies = CookieScope::parse(&options.cookies, &url)?;

        log::debug!(
            "Validated {} {} ({} header(s), {} cookie(s), body: {})",
            method,
            url,
            headers.len(),
            cookies.pairs().len(),
            body.has_body()
        );

        Ok(Self {
            url,
            method,
            headers,
            cookies,
            body,
            timeout: options.deadline(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn options(url: &str) -> HttpOptions {
        HttpOptions {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!(HttpMethod::parse("get").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("Patch").unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::parse("DELETE").unwrap(), HttpMethod::Delete);
    }

    #[test]
    fn test_method_allow_list() {
        let names: Vec<String> = HttpMethod::iter().map(|m| m.to_string()).collect();
        assert_eq!(names, ["GET", "HEAD", "PUT", "POST", "PATCH", "DELETE"]);
        for method in HttpMethod::iter() {
            assert_eq!(method.as_http().as_str(), method.as_ref());
        }
    }

    #[test]
    fn test_unsupported_method_is_uppercased() {
        let err = HttpMethod::parse("options").unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedMethod(ref m) if m == "OPTIONS"));
        assert!(HttpMethod::parse("TRACE").is_err());
    }

    #[test]
    fn test_from_options_defaults() {
        let spec = RequestSpec::from_options(&options("http://127.0.0.1:1/")).unwrap();
        assert_eq!(spec.method, HttpMethod::Get);
        assert!(spec.headers.is_empty());
        assert!(spec.cookies.is_empty());
        assert_eq!(spec.body, BodySource::Empty);
        assert_eq!(spec.timeout, None);
    }

    #[test]
    fn test_from_options_conflict_reported_first() {
        let mut opts = options("not a url");
        opts.data = Some("x".to_string());
        opts.data_file = Some("body.txt".into());
        let err = RequestSpec::from_options(&opts).unwrap_err();
        assert!(matches!(err, ValidationError::ConfigConflict(_)));
    }

    #[test]
    fn test_from_options_rejects_bad_url_before_method() {
        let mut opts = options("example.com");
        opts.method = "bogus".to_string();
        let err = RequestSpec::from_options(&opts).unwrap_err();
        assert!(matches!(err, ValidationError::MissingScheme { .. }));
    }

    #[test]
    fn test_from_options_data_file_sets_content_type() {
        let mut opts = options("http://127.0.0.1:1/");
        opts.data_file = Some("-".into());
        opts.timeout = Duration::from_secs(3);
        let spec = RequestSpec::from_options(&opts).unwrap();
        assert_eq!(spec.body, BodySource::Stdin);
        assert_eq!(spec.headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(spec.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_get_is_bare() {
        let spec = RequestSpec::get(Url::parse("https://example.com").unwrap());
        assert_eq!(spec.method, HttpMethod::Get);
        assert!(!spec.body.has_body());
    }
}
