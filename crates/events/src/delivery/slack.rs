//! Slack incoming-webhook delivery with retry.
//!
//! [`SlackNotifier`] posts `{"text": ...}` to the configured webhook URL.
//! Failed attempts are retried with the configured backoff delays
//! (1 s, 2 s by default). A notifier built without a URL fails every call
//! with [`NotifyError::MissingConfiguration`] instead of crashing the process.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

/// Environment variable holding the Slack webhook URL.
pub const SLACK_WEBHOOK_URL_VAR: &str = "SLACK_WEBHOOK_URL";

/// Default retry delays between attempts.
const DEFAULT_RETRY_DELAYS: [Duration; 2] = [Duration::from_secs(1), Duration::from_secs(2)];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A required endpoint or credential is not configured.
    #[error("{0} environment variable not set")]
    MissingConfiguration(&'static str),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("Error sending request to Slack: {0}")]
    Request(#[from] reqwest::Error),

    /// The webhook answered with a non-2xx status.
    #[error("Slack returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Notifier port
// ---------------------------------------------------------------------------

/// Delivers human-readable text to a messaging endpoint.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// SlackNotifier
// ---------------------------------------------------------------------------

/// Posts messages to a Slack incoming webhook.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    retry_delays: Vec<Duration>,
}

impl SlackNotifier {
    /// Create a notifier; `webhook_url` may be absent.
    pub fn new(webhook_url: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.filter(|url| !url.trim().is_empty()),
            retry_delays: DEFAULT_RETRY_DELAYS.to_vec(),
        })
    }

    /// Override the backoff schedule (an empty list means a single attempt).
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Execute a single POST and check the response status.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let url = self
            .webhook_url
            .as_deref()
            .ok_or(NotifyError::MissingConfiguration(SLACK_WEBHOOK_URL_VAR))?;
        let payload = json!({ "text": text });

        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(url, &payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "Slack delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(url, &payload).await.map_err(|e| {
            tracing::error!(error = %e, "Slack delivery failed after all retries");
            e
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;

    use super::*;

    #[derive(Clone, Default)]
    struct Hook {
        bodies: Arc<Mutex<Vec<Value>>>,
        /// Number of leading requests answered with 500.
        failures: Arc<Mutex<usize>>,
    }

    async fn receive(State(hook): State<Hook>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
        hook.bodies.lock().unwrap().push(body);
        let mut failures = hook.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom");
        }
        (StatusCode::OK, "ok")
    }

    async fn spawn_hook(failures: usize) -> (String, Hook) {
        let hook = Hook::default();
        *hook.failures.lock().unwrap() = failures;
        let app = Router::new()
            .route("/slack", post(receive))
            .with_state(hook.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/slack"), hook)
    }

    #[tokio::test]
    async fn missing_url_is_missing_configuration() {
        let notifier = SlackNotifier::new(None).unwrap();
        assert!(!notifier.is_configured());
        let err = notifier.notify("hello").await.unwrap_err();
        assert_matches!(err, NotifyError::MissingConfiguration(SLACK_WEBHOOK_URL_VAR));
        assert_eq!(err.to_string(), "SLACK_WEBHOOK_URL environment variable not set");
    }

    #[tokio::test]
    async fn blank_url_counts_as_missing() {
        let notifier = SlackNotifier::new(Some("  ".into())).unwrap();
        assert!(!notifier.is_configured());
    }

    #[tokio::test]
    async fn posts_text_payload() {
        let (url, hook) = spawn_hook(0).await;
        let notifier = SlackNotifier::new(Some(url)).unwrap();

        notifier.notify("build is green").await.unwrap();

        let bodies = hook.bodies.lock().unwrap();
        assert_eq!(bodies.as_slice(), &[serde_json::json!({ "text": "build is green" })]);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let (url, hook) = spawn_hook(2).await;
        let notifier = SlackNotifier::new(Some(url))
            .unwrap()
            .with_retry_delays(vec![Duration::from_millis(1), Duration::from_millis(1)]);

        notifier.notify("eventually").await.unwrap();
        assert_eq!(hook.bodies.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn reports_status_and_body_after_retries() {
        let (url, hook) = spawn_hook(10).await;
        let notifier = SlackNotifier::new(Some(url))
            .unwrap()
            .with_retry_delays(vec![Duration::from_millis(1)]);

        let err = notifier.notify("never").await.unwrap_err();
        assert_matches!(err, NotifyError::HttpStatus { status: 500, ref body } if body == "boom");
        assert_eq!(hook.bodies.lock().unwrap().len(), 2);
    }
}
