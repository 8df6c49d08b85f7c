//! Domain types and pure logic for the GitHub Actions event relay.
//!
//! This crate has no I/O. It defines the normalized [`event::Event`] record,
//! the per-workflow status reduction, and the text builders used by the
//! downstream notifier. Storage lives in `cirelay-db`, HTTP in `cirelay-api`.

pub mod error;
pub mod event;
pub mod summary;
pub mod workflow;

pub use error::CoreError;
pub use event::{Event, WorkflowRun, DEFAULT_EVENT_TYPE};
pub use workflow::{WorkflowStatusReport, WorkflowSummary};
