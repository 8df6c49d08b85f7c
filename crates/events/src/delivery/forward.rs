//! Best-effort mirror of normalized events to a second HTTP endpoint.
//!
//! [`EventForwarder`] POSTs each [`Event`] as JSON. There is a single
//! attempt bounded by a short timeout; [`forward_logged`](EventForwarder::forward_logged)
//! swallows every failure so the primary acknowledgement is never affected.

use std::time::Duration;

use cirelay_core::Event;

/// Timeout used when none is configured.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for forward delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Forward endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// EventForwarder
// ---------------------------------------------------------------------------

/// Forwards events to a fixed URL.
#[derive(Clone)]
pub struct EventForwarder {
    client: reqwest::Client,
    url: String,
}

impl EventForwarder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one event; no retry.
    pub async fn forward(&self, event: &Event) -> Result<(), ForwardError> {
        let response = self.client.post(&self.url).json(event).send().await?;
        if !response.status().is_success() {
            return Err(ForwardError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    /// Send one event and log, rather than return, any failure.
    pub async fn forward_logged(&self, event: &Event) {
        match self.forward(event).await {
            Ok(()) => {
                tracing::debug!(url = %self.url, event_type = %event.event_type, "Event forwarded");
            }
            Err(e) => {
                tracing::warn!(
                    url = %self.url,
                    event_type = %event.event_type,
                    error = %e,
                    "Event forward failed, ignoring"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
