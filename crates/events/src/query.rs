//! Event Query Service.
//!
//! Holds no state of its own: every call reloads the full log from the
//! repository, so results always reflect the latest persisted writes.

use std::sync::Arc;

use cirelay_core::event::most_recent;
use cirelay_core::workflow::reduce_workflow_status;
use cirelay_core::{Event, WorkflowStatusReport};
use cirelay_db::{EventRepository, StoreError};

/// Number of events returned by [`EventQueryService::recent_events`] when the
/// caller does not specify a limit.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Read-side operations over the event log.
#[derive(Clone)]
pub struct EventQueryService {
    repo: Arc<dyn EventRepository>,
}

impl EventQueryService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    /// The last `limit` events, oldest first.
    ///
    /// Returns every stored event when `limit` exceeds the stored count.
    pub async fn recent_events(&self, limit: usize) -> Result<Vec<Event>, StoreError> {
        let events = self.repo.load().await?;
        Ok(most_recent(&events, limit).to_vec())
    }

    /// Latest status per workflow, optionally restricted to one workflow name.
    ///
    /// Returns [`WorkflowStatusReport::NoEvents`] when no stored event carries
    /// workflow data, and an empty map when only the filter failed to match.
    pub async fn workflow_status(
        &self,
        workflow_name: Option<&str>,
    ) -> Result<WorkflowStatusReport, StoreError> {
        let events = self.repo.load().await?;
        let report = reduce_workflow_status(&events, workflow_name);
        tracing::debug!(
            scanned = events.len(),
            workflow_name = workflow_name.unwrap_or("*"),
            no_events = report.is_no_events(),
            "Workflow status reduced"
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
