//! Normalized webhook event record (one per inbound provider callback).
//!
//! [`Event::from_payload`] is the only constructor used on the ingestion
//! path: it extracts the handful of fields the relay cares about and keeps the
//! `workflow_run` / `check_run` objects verbatim. A `workflow_run` is only
//! interpreted later, through [`Event::parsed_workflow_run`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Event type recorded when the inbound call carries no event header.
pub const DEFAULT_EVENT_TYPE: &str = "unknown";

/// Header carrying the provider's event name.
pub const EVENT_TYPE_HEADER: &str = "X-GitHub-Event";

// ---------------------------------------------------------------------------
// WorkflowRun
// ---------------------------------------------------------------------------

/// Typed view of the `workflow_run` fields used for status reduction.
///
/// Other provider fields are ignored here; the stored event keeps the whole
/// object untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkflowRun {
    /// Workflow identity (the workflow file's `name:`).
    pub name: String,
    /// `queued`, `in_progress`, `completed`, ...
    pub status: String,
    /// Terminal outcome, present once `status` is `completed`.
    #[serde(default)]
    pub conclusion: Option<String>,
    pub run_number: i64,
    /// ISO-8601 timestamp string used to pick the latest run per workflow.
    pub updated_at: String,
    pub html_url: String,
}

impl WorkflowRun {
    /// Read the typed fields out of a raw `workflow_run` object.
    pub fn from_value(raw: &Value) -> Result<Self, CoreError> {
        Self::deserialize(raw)
            .map_err(|e| CoreError::MalformedPayload(format!("invalid workflow_run: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One normalized record derived from an inbound webhook call.
///
/// Events are immutable once appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Receipt instant assigned by the ingestor (UTC).
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    /// Value of the `X-GitHub-Event` header, or [`DEFAULT_EVENT_TYPE`].
    pub event_type: String,
    /// Top-level `action`; a non-string value is not recorded.
    pub action: Option<String>,
    /// `workflow_run` object, stored as received.
    pub workflow_run: Option<Value>,
    /// Opaque `check_run` object, stored as received.
    pub check_run: Option<Value>,
    /// `repository.full_name`, e.g. `"octo-org/octo-repo"`.
    pub repository: Option<String>,
    /// `sender.login` of the actor that triggered the callback.
    pub sender: Option<String>,
}

impl Event {
    /// Parse a raw request body and normalize it into an [`Event`].
    ///
    /// Fails with [`CoreError::MalformedPayload`] when the body is not JSON
    /// or is not a JSON object. Nested objects are not validated.
    pub fn from_payload(
        body: &[u8],
        event_type: Option<&str>,
        received_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let payload: Value = serde_json::from_slice(body)?;
        Self::from_value(payload, event_type, received_at)
    }

    /// Normalize an already-parsed payload.
    pub fn from_value(
        payload: Value,
        event_type: Option<&str>,
        received_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let Value::Object(mut fields) = payload else {
            return Err(CoreError::MalformedPayload(
                "expected a JSON object".to_string(),
            ));
        };

        let workflow_run = take_non_null(&mut fields, "workflow_run");
        let check_run = take_non_null(&mut fields, "check_run");

        Ok(Self {
            timestamp: received_at,
            event_type: event_type.unwrap_or(DEFAULT_EVENT_TYPE).to_string(),
            action: fields
                .get("action")
                .and_then(Value::as_str)
                .map(str::to_owned),
            workflow_run,
            check_run,
            repository: nested_str(&fields, "repository", "full_name"),
            sender: nested_str(&fields, "sender", "login"),
        })
    }

    /// Typed view of `workflow_run`: `None` when absent, an error when the
    /// stored object lacks a field [`WorkflowRun`] needs.
    pub fn parsed_workflow_run(&self) -> Option<Result<WorkflowRun, CoreError>> {
        self.workflow_run.as_ref().map(WorkflowRun::from_value)
    }

    /// `workflow_run.name`, when present as a string.
    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow_run
            .as_ref()
            .and_then(|run| run.get("name"))
            .and_then(Value::as_str)
    }
}

/// Remove `key` from `fields`, treating `null` as absent.
fn take_non_null(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(|v| !v.is_null())
}

/// Look up `fields[outer][inner]` as a string.
fn nested_str(fields: &Map<String, Value>, outer: &str, inner: &str) -> Option<String> {
    fields
        .get(outer)
        .and_then(|v| v.get(inner))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Return the last `limit` events of `events`, oldest first.
///
/// A `limit` larger than the slice yields the whole slice.
pub fn most_recent(events: &[Event], limit: usize) -> &[Event] {
    &events[events.len().saturating_sub(limit)..]
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (with offset) and naive `YYYY-MM-DDTHH:MM:SS[.ffffff]`,
/// which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serialize as RFC 3339 with microseconds; deserialize via [`parse_timestamp`]
/// so logs written without an offset still load.
mod timestamp_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
