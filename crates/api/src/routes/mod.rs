pub mod health;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /events/recent                 recent events (?limit=)
/// /workflows/status              latest status per workflow (?workflow_name=)
/// /notifications/status          post a status update to Slack (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/recent",
            get(handlers::events::list_recent_events),
        )
        .route(
            "/workflows/status",
            get(handlers::workflows::get_workflow_status),
        )
        .route(
            "/notifications/status",
            post(handlers::notifications::send_status_notification),
        )
}
