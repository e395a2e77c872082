mod health;
mod messages;

use axum::{
    routing::{get, post},
    Router,
};

pub use messages::{SendMessageRequest, SendMessageResponse};

/// Creates the router with all handler routes
#[must_use]
pub fn handler() -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/v1/messages", post(messages::send_message))
}
