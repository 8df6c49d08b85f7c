//! Webhook Ingestor: the only path that mutates the event store.
//!
//! [`Ingestor::handle`] normalizes a raw provider callback into an
//! [`Event`] and appends it. In [`IngestMode::Deferred`] the append runs on a
//! tracked background task after the acknowledgement has been produced, so a
//! caller may see `received` for an event whose write later fails or is lost
//! when the process dies before the task runs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use cirelay_core::event::EVENT_TYPE_HEADER;
use cirelay_core::Event;
use cirelay_db::EventRepository;
use cirelay_events::EventForwarder;
use serde::Serialize;
use tokio_util::task::TaskTracker;

use crate::error::AppResult;

/// When the store append happens relative to the HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Append before responding; store failures reach the caller.
    Sync,
    /// Respond first, append on a background task.
    Deferred,
}

impl IngestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestMode::Sync => "sync",
            IngestMode::Deferred => "deferred",
        }
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(IngestMode::Sync),
            "deferred" => Ok(IngestMode::Deferred),
            other => Err(format!("unknown ingest mode: {other}")),
        }
    }
}

/// Acknowledgement returned to the webhook sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventReceipt {
    pub status: &'static str,
}

impl EventReceipt {
    pub const fn received() -> Self {
        Self { status: "received" }
    }
}

/// Normalizes inbound callbacks and appends them to the store.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn EventRepository>,
    mode: IngestMode,
    forwarder: Option<EventForwarder>,
    tasks: TaskTracker,
}

impl Ingestor {
    /// `tasks` tracks deferred appends and forwards so shutdown can drain them.
    pub fn new(store: Arc<dyn EventRepository>, mode: IngestMode, tasks: TaskTracker) -> Self {
        Self {
            store,
            mode,
            forwarder: None,
            tasks,
        }
    }

    /// Mirror every normalized event to `forwarder` (best effort).
    pub fn with_forwarder(mut self, forwarder: EventForwarder) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn mode(&self) -> IngestMode {
        self.mode
    }

    /// Parse, normalize, and record one webhook call.
    ///
    /// A body that is not a JSON object fails with `MalformedPayload` and
    /// leaves the store untouched.
    pub async fn handle(&self, body: &[u8], headers: &HeaderMap) -> AppResult<EventReceipt> {
        let event_type = headers
            .get(EVENT_TYPE_HEADER)
            .and_then(|v| v.to_str().ok());
        let event = Event::from_payload(body, event_type, Utc::now())?;

        tracing::info!(
            event_type = %event.event_type,
            action = event.action.as_deref().unwrap_or("-"),
            repository = event.repository.as_deref().unwrap_or("-"),
            workflow = event.workflow_name().unwrap_or("-"),
            mode = %self.mode,
            "Webhook event received"
        );

        match self.mode {
            IngestMode::Sync => {
                self.store.append(event.clone()).await?;
                if let Some(forwarder) = self.forwarder.clone() {
                    self.tasks.spawn(async move {
                        forwarder.forward_logged(&event).await;
                    });
                }
            }
            IngestMode::Deferred => {
                let store = Arc::clone(&self.store);
                let forwarder = self.forwarder.clone();
                self.tasks.spawn(async move {
                    if let Err(e) = store.append(event.clone()).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Deferred append failed, event lost"
                        );
                    }
                    if let Some(forwarder) = forwarder {
                        forwarder.forward_logged(&event).await;
                    }
                });
            }
        }

        Ok(EventReceipt::received())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
