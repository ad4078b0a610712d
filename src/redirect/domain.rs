//! Protected domain set and label-boundary membership.
//!
//! Hosts are compared by their dot-separated label sequence, never by raw
//! string suffix. `strings.ends_with`-style matching would accept
//! `notexample.com` or `example.com.attacker.net` for root `example.com`;
//! label comparison excludes that class by construction.

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

/// Reasons an operator-supplied domain entry is refused at load time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainPolicyError {
    #[error("protected domain must not be empty")]
    Empty,
    #[error("protected domain must not carry a scheme: {0:?}")]
    SchemePrefixed(String),
    #[error("protected domain must not contain a wildcard: {0:?}")]
    Wildcard(String),
    #[error("protected domain must not be an IP literal: {0:?}")]
    IpLiteral(String),
    #[error("protected domain contains an empty label: {0:?}")]
    EmptyLabel(String),
}

/// An operator-configured root domain, parsed into its label sequence.
///
/// Immutable after construction; invalid entries are rejected here, at
/// configuration load, never at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedDomain {
    labels: Vec<String>,
}

impl ProtectedDomain {
    pub fn new(domain: &str) -> Result<Self, DomainPolicyError> {
        let trimmed = domain.trim();
        if trimmed.is_empty() {
            return Err(DomainPolicyError::Empty);
        }
        if trimmed.contains("://") {
            return Err(DomainPolicyError::SchemePrefixed(trimmed.to_string()));
        }
        if trimmed.contains('*') {
            return Err(DomainPolicyError::Wildcard(trimmed.to_string()));
        }
        let bare = trimmed.trim_start_matches('[').trim_end_matches(']');
        if bare.parse::<IpAddr>().is_ok() {
            return Err(DomainPolicyError::IpLiteral(trimmed.to_string()));
        }

        let labels: Vec<String> = trimmed
            .to_ascii_lowercase()
            .split('.')
            .map(str::to_owned)
            .collect();
        if labels.iter().any(String::is_empty) {
            return Err(DomainPolicyError::EmptyLabel(trimmed.to_string()));
        }

        Ok(Self { labels })
    }

    /// True iff `host_labels` equals this domain or is a subdomain of it,
    /// compared trailing-label by trailing-label.
    fn matches(&self, host_labels: &[&str]) -> bool {
        if host_labels.len() < self.labels.len() {
            return false;
        }
        self.labels
            .iter()
            .rev()
            .zip(host_labels.iter().rev())
            .all(|(domain_label, host_label)| domain_label == host_label)
    }
}

impl fmt::Display for ProtectedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join("."))
    }
}

/// The configured set of protected root domains.
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    domains: Vec<ProtectedDomain>,
}

impl DomainPolicy {
    pub fn new(domains: Vec<ProtectedDomain>) -> Self {
        Self { domains }
    }

    pub fn domains(&self) -> &[ProtectedDomain] {
        &self.domains
    }

    /// Membership test: `host` is protected iff it equals a configured root
    /// domain or is a subdomain of one, at any depth.
    ///
    /// A host with an empty label (FQDN trailing dot, consecutive dots)
    /// never matches.
    pub fn is_protected(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let host_labels: Vec<&str> = host.split('.').collect();
        if host_labels.iter().any(|label| label.is_empty()) {
            return false;
        }
        self.domains.iter().any(|domain| domain.matches(&host_labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(roots: &[&str]) -> DomainPolicy {
        DomainPolicy::new(
            roots
                .iter()
                .map(|root| ProtectedDomain::new(root).unwrap())
                .collect(),
        )
    }

    #[test]
    fn rejects_invalid_entries() {
        assert_eq!(ProtectedDomain::new(""), Err(DomainPolicyError::Empty));
        assert_eq!(ProtectedDomain::new("   "), Err(DomainPolicyError::Empty));
        assert!(matches!(
            ProtectedDomain::new("https://example.com"),
            Err(DomainPolicyError::SchemePrefixed(_))
        ));
        assert!(matches!(
            ProtectedDomain::new("*.example.com"),
            Err(DomainPolicyError::Wildcard(_))
        ));
        assert!(matches!(
            ProtectedDomain::new("192.168.1.1"),
            Err(DomainPolicyError::IpLiteral(_))
        ));
        assert!(matches!(
            ProtectedDomain::new("[::1]"),
            Err(DomainPolicyError::IpLiteral(_))
        ));
        assert!(matches!(
            ProtectedDomain::new(".example.com"),
            Err(DomainPolicyError::EmptyLabel(_))
        ));
        assert!(matches!(
            ProtectedDomain::new("example..com"),
            Err(DomainPolicyError::EmptyLabel(_))
        ));
    }

    #[test]
    fn apex_and_subdomains_are_protected() {
        let policy = policy(&["example.com"]);
        assert!(policy.is_protected("example.com"));
        assert!(policy.is_protected("secure.example.com"));
        assert!(policy.is_protected("a.b.c.example.com"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let policy = policy(&["example.com"]);
        assert!(policy.is_protected("SECURE.EXAMPLE.COM"));

        let mixed = DomainPolicy::new(vec![ProtectedDomain::new("Example.COM").unwrap()]);
        assert!(mixed.is_protected("secure.example.com"));
    }

    #[test]
    fn shared_suffix_strings_are_not_protected() {
        let policy = policy(&["example.com"]);
        // The raw-suffix vulnerability class: these all end with "example.com"
        // as a string but not on a label boundary.
        assert!(!policy.is_protected("notexample.com"));
        assert!(!policy.is_protected("evil-example.com"));
        assert!(!policy.is_protected("publicexample.com"));
    }

    #[test]
    fn suffix_confusion_hosts_are_not_protected() {
        let policy = policy(&["example.com"]);
        assert!(!policy.is_protected("public.example.com.a"));
        assert!(!policy.is_protected("example.com.attacker.net"));
    }

    #[test]
    fn unrelated_and_sibling_domains_are_not_protected() {
        let policy = policy(&["example.com"]);
        assert!(!policy.is_protected("www.google.fr"));
        assert!(!policy.is_protected("example.org"));
        assert!(!policy.is_protected("com"));
    }

    #[test]
    fn trailing_dot_hosts_fail_closed() {
        let policy = policy(&["example.com"]);
        assert!(!policy.is_protected("secure.example.com."));
        assert!(!policy.is_protected("example.com."));
    }

    #[test]
    fn multiple_roots_are_each_protected() {
        let policy = policy(&["example.com", "example.org"]);
        assert!(policy.is_protected("app.example.com"));
        assert!(policy.is_protected("app.example.org"));
        assert!(!policy.is_protected("app.example.net"));
    }
}
