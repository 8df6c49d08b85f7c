use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Largest delivery GitHub sends (25 MB); axum's default cap is 2 MB.
pub const MAX_WEBHOOK_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Mount the provider webhook endpoint (root level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/webhook/github",
        post(handlers::webhook::receive_github_webhook)
            .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY_BYTES)),
    )
}
