//! Redirect target authorization.
//!
//! After a user completes authentication, the portal may be asked to send the
//! browser back to the URL it originally came from. That URL is
//! attacker-shaped input: honoring it blindly is an open redirect. This
//! module decides, per candidate, whether the redirect is safe to issue.
//!
//! The decision composes three independent checks:
//! - [`url`]: strict parse of the raw candidate into a typed [`TargetUrl`]
//! - [`domain`]: label-boundary membership test against the protected domains
//! - [`scheme`]: encrypted-transport enforcement
//!
//! [`engine`] ties them together and produces a [`Verdict`]. The engine is a
//! pure function over its arguments plus an immutable policy snapshot; it is
//! safe to call from any number of concurrent requests.

pub mod domain;
pub mod engine;
pub mod scheme;
pub mod url;

pub use domain::{DomainPolicy, DomainPolicyError, ProtectedDomain};
pub use engine::{AuthorizationEngine, DenyReason, RedirectPolicy, Verdict};
pub use url::{RedirectParseError, TargetUrl};
