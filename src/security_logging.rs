//! Structured security audit logging.
//!
//! Every redirect authorization decision and configuration change is emitted
//! as a serialized event on the `security_audit` target. Deny causes are
//! distinguished here, server-side only; clients always see the same landing
//! page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Classes of security-relevant events the portal emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    RedirectAuthorization,
    ConfigReload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecuritySeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single security audit event.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: SecurityEventType,
    pub severity: SecuritySeverity,
    pub source: String,
    pub description: String,
    pub actor: Option<String>,
    pub target: Option<String>,
    pub outcome: Option<String>,
    pub reason: Option<String>,
    pub auth_level: Option<String>,
}

impl SecurityEvent {
    pub fn new(
        event_type: SecurityEventType,
        severity: SecuritySeverity,
        source: String,
        description: String,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            severity,
            source,
            description,
            actor: None,
            target: None,
            outcome: None,
            reason: None,
            auth_level: None,
        }
    }

    pub fn with_actor(mut self, actor: String) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_target(mut self, target: String) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_outcome(mut self, outcome: String) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn with_auth_level(mut self, auth_level: String) -> Self {
        self.auth_level = Some(auth_level);
        self
    }
}

/// Security logger for structured audit logging.
pub struct SecurityLogger;

impl SecurityLogger {
    /// Emit an event at the level its severity maps to.
    pub fn log_event(event: &SecurityEvent) {
        let event_json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize security event: {}", e);
                return;
            }
        };

        match event.severity {
            SecuritySeverity::Critical | SecuritySeverity::High => {
                error!(
                    target: "security_audit",
                    event_id = %event.event_id,
                    event_type = ?event.event_type,
                    severity = ?event.severity,
                    "SECURITY_EVENT: {}",
                    event_json
                );
            }
            SecuritySeverity::Medium => {
                warn!(
                    target: "security_audit",
                    event_id = %event.event_id,
                    event_type = ?event.event_type,
                    severity = ?event.severity,
                    "SECURITY_EVENT: {}",
                    event_json
                );
            }
            SecuritySeverity::Low => {
                info!(
                    target: "security_audit",
                    event_id = %event.event_id,
                    event_type = ?event.event_type,
                    severity = ?event.severity,
                    "SECURITY_EVENT: {}",
                    event_json
                );
            }
        }
    }
}
