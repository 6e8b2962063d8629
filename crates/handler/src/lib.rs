//! HTTP trigger surface for registration events.
//!
//! - POST /        push-delivered event envelope → verification email + send-time record
//! - GET  /health  liveness

pub mod routes;
pub mod state;
