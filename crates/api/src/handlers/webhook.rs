//! Handler for inbound GitHub webhook callbacks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::AppResult;
use crate::ingest::EventReceipt;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /webhook/github
// ---------------------------------------------------------------------------

/// Record one GitHub webhook delivery.
///
/// The body is read raw so an unparseable payload is reported as
/// `MALFORMED_PAYLOAD` (400) rather than an extractor rejection.
pub async fn receive_github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<EventReceipt>> {
    let receipt = state.ingestor.handle(&body, &headers).await?;
    Ok(Json(receipt))
}
