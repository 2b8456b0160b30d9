//! Validated newtype wrappers for configuration values.
//!
//! These wrappers validate their contents on construction so that a
//! [`Config`](crate::Config) can never hold a malformed base URL or an empty
//! identifier key.

use crate::error::ConfigError;
use std::fmt;

/// A validated identifier key: the domain-object field holding resource ids.
///
/// # Example
///
/// ```rust
/// use resource_client::IdentifierKey;
///
/// let key = IdentifierKey::new("_id").unwrap();
/// assert_eq!(key.as_ref(), "_id");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdentifierKey(String);

impl IdentifierKey {
    /// Creates a new validated identifier key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyIdentifier`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyIdentifier);
        }
        Ok(Self(key))
    }
}

impl Default for IdentifierKey {
    fn default() -> Self {
        Self("id".to_string())
    }
}

impl AsRef<str> for IdentifierKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated base URL that every route is rendered against.
///
/// The URL may carry a path prefix (e.g. `https://api.example.com/v1`).
/// Trailing slashes are removed so that rendering never produces `//`.
///
/// # Example
///
/// ```rust
/// use resource_client::BaseUrl;
///
/// let url = BaseUrl::new("https://api.example.com/v1/").unwrap();
/// assert_eq!(url.as_ref(), "https://api.example.com/v1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL has no scheme or host,
    /// or carries a query string or fragment.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidBaseUrl { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;

        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(invalid());
        }

        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        let host = &url[host_start..host_end];
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(invalid());
        }

        if url[host_end..].contains(['?', '#']) {
            return Err(invalid());
        }

        Ok(Self(url))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rejects_empty_string() {
        assert!(matches!(
            IdentifierKey::new(""),
            Err(ConfigError::EmptyIdentifier)
        ));
        assert!(matches!(
            IdentifierKey::new("   "),
            Err(ConfigError::EmptyIdentifier)
        ));
    }

    #[test]
    fn test_identifier_defaults_to_id() {
        assert_eq!(IdentifierKey::default().as_ref(), "id");
    }

    #[test]
    fn test_base_url_accepts_port_and_path() {
        let url = BaseUrl::new("http://localhost:8080/api").unwrap();
        assert_eq!(url.as_ref(), "http://localhost:8080/api");
        assert_eq!(url.to_string(), "http://localhost:8080/api");
    }

    #[test]
    fn test_base_url_trims_trailing_slashes() {
        let url = BaseUrl::new("https://api.example.com//").unwrap();
        assert_eq!(url.as_ref(), "https://api.example.com");
    }

    #[test]
    fn test_base_url_rejects_invalid_values() {
        for bad in [
            "",
            "api.example.com",
            "://api.example.com",
            "https://",
            "ht1p://api.example.com",
            "https://api.example.com/v1?x=1",
            "https://api.example.com#top",
        ] {
            assert!(
                matches!(BaseUrl::new(bad), Err(ConfigError::InvalidBaseUrl { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
