//! Handlers for the latest-status-per-workflow view.

use axum::extract::{Query, State};
use axum::Json;
use cirelay_core::WorkflowStatusReport;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::query::WorkflowStatusParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /workflows/status
// ---------------------------------------------------------------------------

/// Latest status per workflow.
///
/// Responds `{"message": ...}` when nothing with workflow data has been
/// recorded, and `{"data": {name: summary}}` otherwise (an empty object when
/// `?workflow_name=` matched nothing). A blank `workflow_name` is ignored.
pub async fn get_workflow_status(
    State(state): State<AppState>,
    Query(params): Query<WorkflowStatusParams>,
) -> AppResult<Json<Value>> {
    let report = state
        .queries
        .workflow_status(params.name_filter())
        .await?;

    let body = match &report {
        WorkflowStatusReport::NoEvents => report.to_json(),
        WorkflowStatusReport::Workflows(_) => json!({ "data": report.to_json() }),
    };
    Ok(Json(body))
}
