//! Handlers for the recent events listing.

use axum::extract::{Query, State};
use axum::Json;
use cirelay_core::Event;
use cirelay_events::DEFAULT_RECENT_LIMIT;

use crate::error::AppResult;
use crate::query::RecentEventsParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /events/recent
// ---------------------------------------------------------------------------

/// The most recent events, oldest first (`?limit=`, default 10).
pub async fn list_recent_events(
    State(state): State<AppState>,
    Query(params): Query<RecentEventsParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let events = state.queries.recent_events(limit).await?;
    Ok(Json(DataResponse { data: events }))
}
