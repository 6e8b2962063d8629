pub mod health;
pub mod pubsub;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(pubsub::router())
        .with_state(state)
}
