//! Query parameter types for the read endpoints.

use serde::Deserialize;

/// `?limit=` for the recent events listing.
#[derive(Debug, Deserialize)]
pub struct RecentEventsParams {
    pub limit: Option<usize>,
}

/// `?workflow_name=` filter for the workflow status view.
#[derive(Debug, Deserialize)]
pub struct WorkflowStatusParams {
    pub workflow_name: Option<String>,
}

impl WorkflowStatusParams {
    /// The filter to apply; a blank `workflow_name` means no filter.
    pub fn name_filter(&self) -> Option<&str> {
        self.workflow_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}
