//! Request header assembly.

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{CONTENT_TYPE_HEADER, DEFAULT_CONTENT_TYPE, HEADER_DELIMITER};
use crate::error_handling::ValidationError;

/// One header name with all of its values in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    name: String,
    values: Vec<String>,
    key: HeaderName,
    wire: Vec<HeaderValue>,
}

impl HeaderEntry {
    /// Name as first supplied (case preserved).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in the order they were added.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Ordered, case-preserving header mapping.
///
/// Names compare case-insensitively; a repeated name appends a value to the
/// existing entry and keeps the first spelling. Every name and value is
/// checked against HTTP syntax when inserted, so converting to a
/// [`HeaderMap`] cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<HeaderEntry>,
}

impl HeaderSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to `name`, creating the entry if needed.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        let raw = format!("{name}{HEADER_DELIMITER} {value}");
        self.insert(&raw, name, value, false)
    }

    /// Replaces all values of `name` with `value`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        let raw = format!("{name}{HEADER_DELIMITER} {value}");
        self.insert(&raw, name, value, true)
    }

    fn insert(
        &mut self,
        raw: &str,
        name: &str,
        value: &str,
        replace: bool,
    ) -> Result<(), ValidationError> {
        let key = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ValidationError::InvalidHeader {
                header: raw.to_string(),
                reason: format!("invalid header name {name:?}"),
            }
        })?;
        let wire = HeaderValue::from_str(value).map_err(|_| ValidationError::InvalidHeader {
            header: raw.to_string(),
            reason: format!("invalid header value {value:?}"),
        })?;

        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                if replace {
                    entry.values.clear();
                    entry.wire.clear();
                }
                entry.values.push(value.to_string());
                entry.wire.push(wire);
            }
            None => self.entries.push(HeaderEntry {
                name: name.to_string(),
                values: vec![value.to_string()],
                key,
                wire: vec![wire],
            }),
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if any value is set for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Returns the first value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name)
            .and_then(|entry| entry.values.first())
            .map(String::as_str)
    }

    /// Returns every value of `name` in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.find(name).map(|entry| entry.values()).unwrap_or(&[])
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.entries.iter()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no header is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts to a wire header map, preserving value order within each name.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            for value in &entry.wire {
                map.append(entry.key.clone(), value.clone());
            }
        }
        map
    }
}

/// Parses raw `"Name: value"` strings into a [`HeaderSet`].
///
/// The string is split at the first `:`; the name is kept as supplied and the
/// value is trimmed. When `has_body` is true and no non-empty `Content-Type`
/// was given, `Content-Type: text/plain` is set.
///
/// # Errors
///
/// [`ValidationError::MalformedHeader`] if a string has no `:`, and
/// [`ValidationError::InvalidHeader`] if the name or value is not valid HTTP.
pub fn parse_headers(raw: &[String], has_body: bool) -> Result<HeaderSet, ValidationError> {
    let mut headers = HeaderSet::new();
    for header in raw {
        let (name, value) =
            header
                .split_once(HEADER_DELIMITER)
                .ok_or_else(|| ValidationError::MalformedHeader {
                    header: header.clone(),
                    delimiter: HEADER_DELIMITER,
                })?;
        headers.insert(header, name, value.trim(), false)?;
    }

    // An empty value counts as no Content-Type at all
    let explicit_type = headers
        .get(CONTENT_TYPE_HEADER)
        .is_some_and(|value| !value.is_empty());
    if has_body && !explicit_type {
        headers.set(CONTENT_TYPE_HEADER, DEFAULT_CONTENT_TYPE)?;
    }

    Ok(headers)
}
