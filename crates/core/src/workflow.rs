//! Latest-status-per-workflow reduction.
//!
//! [`reduce_workflow_status`] scans stored events, keeps those carrying a
//! `workflow_run`, and reports for each workflow name the run whose
//! `updated_at` string is lexicographically greatest (it is never parsed as
//! a date). Transitions (`queued -> in_progress ->
//! completed`) are not validated: whatever the latest payload claims is
//! reported, including out-of-order or contradictory data.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::event::{Event, WorkflowRun};

/// Message carried by the "nothing recorded yet" sentinel.
pub const NO_EVENTS_MESSAGE: &str = "No GitHub Actions events received yet";

/// Conclusions that count as a failed run.
pub const FAILED_CONCLUSIONS: &[&str] = &["failure", "timed_out", "startup_failure"];

/// Status value of a run that has reached a terminal state.
pub const STATUS_COMPLETED: &str = "completed";

// ---------------------------------------------------------------------------
// WorkflowSummary
// ---------------------------------------------------------------------------

/// Snapshot of the latest known run of one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub run_number: i64,
    pub updated_at: String,
    pub html_url: String,
}

impl From<&WorkflowRun> for WorkflowSummary {
    fn from(run: &WorkflowRun) -> Self {
        Self {
            name: run.name.clone(),
            status: run.status.clone(),
            conclusion: run.conclusion.clone(),
            run_number: run.run_number,
            updated_at: run.updated_at.clone(),
            html_url: run.html_url.clone(),
        }
    }
}

/// Coarse classification of a summary, used when rendering notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
    /// Completed with a non-success, non-failure conclusion (cancelled, skipped, ...).
    Other,
    InProgress,
}

impl WorkflowSummary {
    pub fn outcome(&self) -> RunOutcome {
        if self.status != STATUS_COMPLETED {
            return RunOutcome::InProgress;
        }
        match self.conclusion.as_deref() {
            Some("success") => RunOutcome::Succeeded,
            Some(c) if FAILED_CONCLUSIONS.contains(&c) => RunOutcome::Failed,
            _ => RunOutcome::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowStatusReport
// ---------------------------------------------------------------------------

/// Result of a workflow status query.
///
/// `NoEvents` means nothing with workflow data has been recorded at all;
/// an empty `Workflows` map means data exists but the name filter matched
/// nothing. Callers must keep the two apart.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowStatusReport {
    NoEvents,
    /// Latest summary per workflow name, in first-seen order.
    Workflows(IndexMap<String, WorkflowSummary>),
}

impl WorkflowStatusReport {
    pub fn is_no_events(&self) -> bool {
        matches!(self, WorkflowStatusReport::NoEvents)
    }

    /// Summary for `name`, if reported.
    pub fn get(&self, name: &str) -> Option<&WorkflowSummary> {
        match self {
            WorkflowStatusReport::NoEvents => None,
            WorkflowStatusReport::Workflows(map) => map.get(name),
        }
    }

    /// Iterate over reported summaries (empty for the sentinel).
    pub fn summaries(&self) -> impl Iterator<Item = &WorkflowSummary> {
        let map = match self {
            WorkflowStatusReport::NoEvents => None,
            WorkflowStatusReport::Workflows(map) => Some(map),
        };
        map.into_iter().flat_map(|m| m.values())
    }

    /// JSON rendering: `{"message": ...}` for the sentinel, otherwise an
    /// object keyed by workflow name.
    pub fn to_json(&self) -> Value {
        match self {
            WorkflowStatusReport::NoEvents => json!({ "message": NO_EVENTS_MESSAGE }),
            WorkflowStatusReport::Workflows(map) => json!(map),
        }
    }
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// Reduce `events` into the latest status per workflow.
///
/// A run replaces the current summary only when its `updated_at` compares
/// strictly greater as a string, so ties keep the first-seen summary. Runs
/// missing a field of [`WorkflowRun`] are skipped with a warning.
pub fn reduce_workflow_status(events: &[Event], workflow_name: Option<&str>) -> WorkflowStatusReport {
    if events.iter().all(|e| e.workflow_run.is_none()) {
        return WorkflowStatusReport::NoEvents;
    }

    let mut latest: IndexMap<String, WorkflowSummary> = IndexMap::new();
    for event in events {
        let run = match event.parsed_workflow_run() {
            None => continue,
            Some(Ok(run)) => run,
            Some(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    received_at = %event.timestamp,
                    "Skipping workflow_run without required fields"
                );
                continue;
            }
        };
        if workflow_name.is_some_and(|name| run.name != name) {
            continue;
        }

        match latest.entry(run.name.clone()) {
            Entry::Occupied(mut slot) => {
                if run.updated_at > slot.get().updated_at {
                    slot.insert(WorkflowSummary::from(&run));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(WorkflowSummary::from(&run));
            }
        }
    }

    WorkflowStatusReport::Workflows(latest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
