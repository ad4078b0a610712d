//! Per-session authentication context.
//!
//! Credential verification, second-factor validation and session storage are
//! owned by the authentication subsystem in front of this service. It
//! forwards the facts the portal needs as internal request headers, which
//! [`session_context`] decodes into an immutable [`AuthContext`] snapshot.
//! The redirect engine only ever reads that snapshot; it never stores or
//! mutates session state.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use serde::{Deserialize, Serialize};

/// Header carrying the authenticated username.
pub const PORTAL_USER_HEADER: &str = "portal-user";
/// Header carrying the factor level the session has reached.
pub const PORTAL_AUTH_LEVEL_HEADER: &str = "portal-auth-level";

/// Factor levels a session can have reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationLevel {
    NotAuthenticated,
    OneFactor,
    TwoFactor,
}

impl AuthenticationLevel {
    fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "one_factor" => Self::OneFactor,
            "two_factor" => Self::TwoFactor,
            _ => Self::NotAuthenticated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::OneFactor => "one_factor",
            Self::TwoFactor => "two_factor",
        }
    }
}

/// Read-only snapshot of the session facts relevant to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: Option<String>,
    pub level: AuthenticationLevel,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            username: None,
            level: AuthenticationLevel::NotAuthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.level != AuthenticationLevel::NotAuthenticated
    }

    /// Decode a snapshot from the forwarded internal headers.
    ///
    /// Absent or unreadable headers decode to an unauthenticated context;
    /// the decode itself never fails the request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let username = headers
            .get(PORTAL_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        let level = headers
            .get(PORTAL_AUTH_LEVEL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(AuthenticationLevel::from_header)
            .unwrap_or(AuthenticationLevel::NotAuthenticated);

        Self { username, level }
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Middleware inserting the decoded [`AuthContext`] as a request extension.
pub async fn session_context(mut request: Request, next: Next) -> Response {
    let context = AuthContext::from_headers(request.headers());
    request.extensions_mut().insert(context);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn decodes_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(PORTAL_USER_HEADER, HeaderValue::from_static("john"));
        headers.insert(PORTAL_AUTH_LEVEL_HEADER, HeaderValue::from_static("two_factor"));

        let context = AuthContext::from_headers(&headers);
        assert_eq!(context.username.as_deref(), Some("john"));
        assert_eq!(context.level, AuthenticationLevel::TwoFactor);
        assert!(context.is_authenticated());
    }

    #[test]
    fn missing_headers_decode_to_anonymous() {
        let context = AuthContext::from_headers(&HeaderMap::new());
        assert_eq!(context, AuthContext::anonymous());
        assert!(!context.is_authenticated());
    }

    #[test]
    fn unknown_levels_decode_to_not_authenticated() {
        let mut headers = HeaderMap::new();
        headers.insert(PORTAL_AUTH_LEVEL_HEADER, HeaderValue::from_static("three_factor"));
        let context = AuthContext::from_headers(&headers);
        assert_eq!(context.level, AuthenticationLevel::NotAuthenticated);
    }

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!(
            AuthenticationLevel::from_header("One_Factor"),
            AuthenticationLevel::OneFactor
        );
    }
}
