//! Portal controller.
//!
//! The request-handling layer around the authorization engine. It is called
//! once per completed login, passes the client-supplied redirect hint
//! through verbatim (decoded exactly once by the query layer), and acts
//! strictly on the returned verdict. It never re-derives or overrides it.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::{internal_error, AuthError};
use crate::redirect::engine::{AuthorizationEngine, Verdict};
use crate::redirect::url::TargetUrl;
use crate::security_logging::{SecurityEvent, SecurityEventType, SecurityLogger, SecuritySeverity};
use crate::session::{AuthContext, AuthenticationLevel};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    /// The redirect hint attached to the login URL.
    pub rd: Option<String>,
}

/// Post-authentication completion endpoint.
///
/// Allow: HTTP redirect to the sanitized target. Deny: the "already
/// authenticated" page, with no indication of why the redirect was refused.
pub async fn finish_login(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Query(params): Query<RedirectParams>,
) -> Response {
    let engine = AuthorizationEngine::new(state.policy.snapshot());
    match engine.authorize(params.rd.as_deref(), &context) {
        Verdict::Allow(target) => Redirect::to(target.as_str()).into_response(),
        Verdict::Deny { fallback, .. } => landing_page(&fallback).into_response(),
    }
}

/// The portal's own landing page.
pub async fn landing(State(state): State<AppState>) -> Html<String> {
    landing_page(&state.policy.snapshot().landing)
}

fn landing_page(portal_url: &TargetUrl) -> Html<String> {
    let href = portal_url.as_str().replace('"', "%22");
    Html(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>Already authenticated</title></head>\n\
         <body>\n\
         <h1>Already authenticated</h1>\n\
         <p>You are signed in. <a href=\"{href}\">Continue to the portal</a>.</p>\n\
         </body>\n\
         </html>\n"
    ))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "auth-portal",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Re-read the configuration sources and swap in a new policy snapshot.
///
/// Only reachable from a two-factor session; the swap is all-or-nothing, so
/// a failed reload leaves the running policy untouched.
pub async fn reload_policy(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<serde_json::Value>, AuthError> {
    if context.level != AuthenticationLevel::TwoFactor {
        SecurityLogger::log_event(
            &SecurityEvent::new(
                SecurityEventType::ConfigReload,
                SecuritySeverity::High,
                "auth-portal".to_string(),
                "policy reload refused".to_string(),
            )
            .with_actor(context.username.clone().unwrap_or_else(|| "anonymous".to_string()))
            .with_outcome("deny".to_string())
            .with_auth_level(context.level.as_str().to_string()),
        );
        return Err(AuthError::Forbidden {
            reason: "two-factor session required".to_string(),
        });
    }

    let config = AppConfig::load().map_err(|e| AuthError::ConfigurationError {
        field: "redirect".to_string(),
        reason: e.to_string(),
    })?;

    // load() already validated, so a failure here is unexpected.
    let version = state
        .policy
        .reload_from(&config.redirect)
        .map_err(|e| internal_error(&format!("policy snapshot swap failed: {e}")))?;

    SecurityLogger::log_event(
        &SecurityEvent::new(
            SecurityEventType::ConfigReload,
            SecuritySeverity::Low,
            "auth-portal".to_string(),
            "redirect policy reloaded".to_string(),
        )
        .with_actor(context.username.unwrap_or_else(|| "anonymous".to_string()))
        .with_outcome("allow".to_string())
        .with_auth_level(context.level.as_str().to_string()),
    );

    Ok(Json(json!({
        "status": "reloaded",
        "version": version,
    })))
}
