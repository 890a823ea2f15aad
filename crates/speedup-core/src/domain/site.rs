//! Site host-name extraction.
//!
//! The hotlink rules must allow the site's own pages to embed its images, so
//! the block is rendered with the host taken from the public base URL.

use thiserror::Error;
use url::Url;

/// Errors produced when deriving the site domain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SiteUrlError {
    /// The base URL could not be parsed at all.
    #[error("invalid site URL '{url}': {reason}")]
    Invalid { url: String, reason: String },

    /// The URL parsed but carries no host (e.g. `file:///var/www`).
    #[error("site URL '{0}' has no host name")]
    MissingHost(String),
}

/// Returns the host component of `base_url`, e.g. `example.com` for
/// `https://example.com/blog/`.
///
/// A leading `www.` is kept: the hotlink rule already accepts the host with
/// or without it.
///
/// # Errors
///
/// Returns [`SiteUrlError::Invalid`] when the URL does not parse and
/// [`SiteUrlError::MissingHost`] when it has no host.
pub fn site_domain(base_url: &str) -> Result<String, SiteUrlError> {
    let url = Url::parse(base_url).map_err(|e| SiteUrlError::Invalid {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| SiteUrlError::MissingHost(base_url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_domain_strips_scheme_and_path() {
        assert_eq!(site_domain("https://example.com/blog/").unwrap(), "example.com");
    }

    #[test]
    fn test_site_domain_ignores_port() {
        assert_eq!(site_domain("http://localhost:8080").unwrap(), "localhost");
    }

    #[test]
    fn test_site_domain_keeps_subdomain() {
        assert_eq!(site_domain("https://www.example.org").unwrap(), "www.example.org");
    }

    #[test]
    fn test_site_domain_rejects_garbage() {
        assert!(matches!(site_domain("not a url"), Err(SiteUrlError::Invalid { .. })));
    }

    #[test]
    fn test_site_domain_rejects_hostless_url() {
        assert_eq!(
            site_domain("file:///var/www"),
            Err(SiteUrlError::MissingHost("file:///var/www".to_string()))
        );
    }
}
