//! Router assembly.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{portal, security_headers, session, AppState};

/// Create the main application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(portal::health))
        .route("/authenticated", get(portal::landing))
        .route("/api/v1/redirect", get(portal::finish_login))
        .route("/api/v1/policy/reload", post(portal::reload_policy))
        .with_state(state)
        .layer(middleware::from_fn(session::session_context))
        .layer(middleware::from_fn(security_headers::security_headers))
}
