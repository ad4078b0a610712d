//! The redirect target authorization engine.

use std::sync::Arc;

use serde::Serialize;

use crate::redirect::domain::DomainPolicy;
use crate::redirect::scheme::is_secure_scheme;
use crate::redirect::url::TargetUrl;
use crate::security_logging::{SecurityEvent, SecurityEventType, SecurityLogger, SecuritySeverity};
use crate::session::AuthContext;

/// Immutable policy snapshot the engine evaluates against.
///
/// Built once from validated configuration; replaced wholesale on reload so
/// no in-flight authorization ever observes a partially updated domain set.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    pub domains: DomainPolicy,
    /// The portal's own "already authenticated" page, used as the fallback
    /// destination for every denial.
    pub landing: TargetUrl,
}

/// Why a candidate was refused. Distinguished in server-side logs only; the
/// client sees the same landing page for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NoTarget,
    MalformedTarget,
    UnsafeTarget,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTarget => "no_target",
            Self::MalformedTarget => "malformed_target",
            Self::UnsafeTarget => "unsafe_target",
        }
    }
}

/// The engine's decision for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Redirect to the parsed, re-serialized target.
    Allow(TargetUrl),
    /// Refuse the candidate and land on the portal's own fallback page.
    Deny {
        reason: DenyReason,
        fallback: TargetUrl,
    },
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Decides whether a client-supplied redirect target may be honored.
///
/// Pure and stateless over its arguments plus the policy snapshot: no I/O,
/// no locking, no shared mutable state, so any number of requests may call
/// [`AuthorizationEngine::authorize`] concurrently.
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    policy: Arc<RedirectPolicy>,
}

impl AuthorizationEngine {
    pub fn new(policy: Arc<RedirectPolicy>) -> Self {
        Self { policy }
    }

    /// Authorize a raw redirect candidate.
    ///
    /// The authentication context never widens the set of allowed targets:
    /// the caller is expected to have settled the authentication decision
    /// before consulting the engine, and `ctx` feeds telemetry only.
    pub fn authorize(&self, raw: Option<&str>, ctx: &AuthContext) -> Verdict {
        let verdict = self.evaluate(raw);
        self.log_decision(raw, &verdict, ctx);
        verdict
    }

    fn evaluate(&self, raw: Option<&str>) -> Verdict {
        let raw = match raw {
            None => return self.deny(DenyReason::NoTarget),
            Some(raw) if raw.is_empty() => return self.deny(DenyReason::NoTarget),
            Some(raw) => raw,
        };

        let Ok(target) = TargetUrl::parse(raw) else {
            return self.deny(DenyReason::MalformedTarget);
        };

        if !self.policy.domains.is_protected(target.host())
            || !is_secure_scheme(target.scheme())
        {
            return self.deny(DenyReason::UnsafeTarget);
        }

        Verdict::Allow(target)
    }

    fn deny(&self, reason: DenyReason) -> Verdict {
        Verdict::Deny {
            reason,
            fallback: self.policy.landing.clone(),
        }
    }

    fn log_decision(&self, raw: Option<&str>, verdict: &Verdict, ctx: &AuthContext) {
        let (severity, description, outcome, target, reason) = match verdict {
            Verdict::Allow(target) => (
                SecuritySeverity::Low,
                "redirect target authorized",
                "allow",
                Some(target.host().to_string()),
                None,
            ),
            Verdict::Deny { reason, .. } => (
                match reason {
                    DenyReason::NoTarget => SecuritySeverity::Low,
                    DenyReason::MalformedTarget | DenyReason::UnsafeTarget => {
                        SecuritySeverity::Medium
                    }
                },
                "redirect target refused",
                "deny",
                raw.map(truncate_for_log),
                Some(reason.as_str().to_string()),
            ),
        };

        let mut event = SecurityEvent::new(
            SecurityEventType::RedirectAuthorization,
            severity,
            "auth-portal".to_string(),
            description.to_string(),
        )
        .with_outcome(outcome.to_string())
        .with_auth_level(ctx.level.as_str().to_string());

        if let Some(actor) = &ctx.username {
            event = event.with_actor(actor.clone());
        }
        if let Some(target) = target {
            event = event.with_target(target);
        }
        if let Some(reason) = reason {
            event = event.with_reason(reason);
        }

        SecurityLogger::log_event(&event);
    }
}

/// Cap attacker-shaped input before it reaches the audit log.
fn truncate_for_log(raw: &str) -> String {
    raw.chars().take(128).collect()
}
