//! Strict parsing of client-supplied redirect targets.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Maximum accepted length for a raw redirect target.
pub const MAX_TARGET_LENGTH: usize = 2048;

/// Reasons a raw redirect target fails to parse.
///
/// All variants collapse to the same client-visible outcome; they are only
/// distinguished in server-side logs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RedirectParseError {
    #[error("redirect target exceeds {MAX_TARGET_LENGTH} bytes")]
    TooLong,
    #[error("redirect target is not a well-formed absolute URL")]
    Malformed,
    #[error("redirect target has no host")]
    MissingHost,
}

/// A parsed, absolute redirect target with a scheme and a normalized host.
///
/// Construction guarantees the URL is absolute and carries a host. The host
/// exposed by [`TargetUrl::host`] is the parser's normalized form
/// (lower-cased, percent-decoded, IDNA-mapped), so policy checks never see
/// the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    inner: Url,
}

impl TargetUrl {
    /// Parse a raw candidate into a `TargetUrl`.
    ///
    /// Relative and protocol-relative input (`//evil.com`) fails to parse:
    /// it is never completed with the portal's own scheme or host. URLs
    /// without a host (`javascript:`, `data:`, `mailto:`) are rejected.
    pub fn parse(raw: &str) -> Result<Self, RedirectParseError> {
        if raw.len() > MAX_TARGET_LENGTH {
            return Err(RedirectParseError::TooLong);
        }

        let inner = Url::parse(raw).map_err(|_| RedirectParseError::Malformed)?;

        if inner.cannot_be_a_base() || inner.host_str().is_none() {
            return Err(RedirectParseError::MissingHost);
        }

        Ok(Self { inner })
    }

    /// Lower-cased scheme.
    pub fn scheme(&self) -> &str {
        self.inner.scheme()
    }

    /// Normalized host.
    pub fn host(&self) -> &str {
        self.inner.host_str().unwrap_or_default()
    }

    /// Explicit port, if the URL carries one.
    pub fn port(&self) -> Option<u16> {
        self.inner.port()
    }

    pub fn path(&self) -> &str {
        self.inner.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.query()
    }

    /// The re-serialized URL. On an allowed redirect this exact string is
    /// what the browser receives, so parsing normalization is always
    /// reflected in the issued redirect.
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_url_with_port_and_path() {
        let target = TargetUrl::parse("https://secure.example.com:8080/secret.html?tab=1").unwrap();
        assert_eq!(target.scheme(), "https");
        assert_eq!(target.host(), "secure.example.com");
        assert_eq!(target.port(), Some(8080));
        assert_eq!(target.path(), "/secret.html");
        assert_eq!(target.query(), Some("tab=1"));
        assert_eq!(
            target.as_str(),
            "https://secure.example.com:8080/secret.html?tab=1"
        );
    }

    #[test]
    fn normalizes_scheme_and_host_case() {
        let target = TargetUrl::parse("HTTPS://SECURE.Example.COM/path").unwrap();
        assert_eq!(target.scheme(), "https");
        assert_eq!(target.host(), "secure.example.com");
    }

    #[test]
    fn rejects_relative_paths() {
        assert_eq!(
            TargetUrl::parse("/local/path"),
            Err(RedirectParseError::Malformed)
        );
    }

    #[test]
    fn rejects_protocol_relative_urls() {
        // "//evil.com" must never be completed with the portal's own scheme.
        assert_eq!(
            TargetUrl::parse("//evil.com/phish"),
            Err(RedirectParseError::Malformed)
        );
    }

    #[test]
    fn rejects_hostless_schemes() {
        assert_eq!(
            TargetUrl::parse("javascript:alert(1)"),
            Err(RedirectParseError::MissingHost)
        );
        assert_eq!(
            TargetUrl::parse("data:text/html,hi"),
            Err(RedirectParseError::MissingHost)
        );
        assert_eq!(
            TargetUrl::parse("mailto:a@example.com"),
            Err(RedirectParseError::MissingHost)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(TargetUrl::parse("not a url").is_err());
        assert!(TargetUrl::parse("").is_err());
        assert!(TargetUrl::parse("https://").is_err());
    }

    #[test]
    fn rejects_oversized_input() {
        let raw = format!("https://example.com/{}", "a".repeat(MAX_TARGET_LENGTH));
        assert_eq!(TargetUrl::parse(&raw), Err(RedirectParseError::TooLong));
    }

    #[test]
    fn userinfo_does_not_confuse_the_host() {
        // The registrable host here is evil.com, not example.com.
        let target = TargetUrl::parse("https://example.com@evil.com/callback").unwrap();
        assert_eq!(target.host(), "evil.com");
    }

    #[test]
    fn unicode_hosts_are_idna_mapped() {
        let target = TargetUrl::parse("https://\u{0435}xample.com/").unwrap();
        assert_ne!(target.host(), "example.com");
        assert!(target.host().starts_with("xn--"));
    }
}
