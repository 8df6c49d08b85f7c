//! Handler that posts the current CI status to the team channel.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NotificationResult {
    /// Human-readable outcome, e.g. `"✅ Message sent successfully to Slack"`.
    pub result: String,
}

// ---------------------------------------------------------------------------
// POST /notifications/status
// ---------------------------------------------------------------------------

/// Summarize workflow status and deliver it to Slack.
///
/// Always answers 200; delivery problems (including a missing
/// `SLACK_WEBHOOK_URL`) are described in `result`.
pub async fn send_status_notification(State(state): State<AppState>) -> Json<NotificationResult> {
    let result = state.reporter.send_status_update().await;
    Json(NotificationResult { result })
}
