//! Liveness endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use verimail_common::config::EmailBackend;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let backend = match state.config.email_backend {
        EmailBackend::Mailgun => "mailgun",
        EmailBackend::Noop => "noop",
    };

    Json(json!({
        "status": "ok",
        "service": "verimail-handler",
        "email_backend": backend,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
