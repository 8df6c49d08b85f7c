//! CI status reporting: workflow status -> summary text -> notifier.
//!
//! [`StatusReporter::send_status_update`] mirrors what an operator runs to
//! post a deployment update to the team channel. It always returns a
//! human-readable result string; failures never escape as errors.

use std::sync::Arc;

use async_trait::async_trait;
use cirelay_core::summary::{analysis_prompt, deployment_prompt, render_status_update};
use cirelay_core::WorkflowStatusReport;
use cirelay_db::StoreError;

use crate::delivery::slack::{Notifier, NotifyError};
use crate::query::EventQueryService;

/// Result text returned after a successful delivery.
pub const SENT_MESSAGE: &str = "✅ Message sent successfully to Slack";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// The external text-completion provider failed or returned nothing.
    #[error("Completion provider failed: {0}")]
    Provider(String),
}

/// Any failure along the report pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

// ---------------------------------------------------------------------------
// Summarizers
// ---------------------------------------------------------------------------

/// Turns a status report into notification text.
#[async_trait]
pub trait CiSummarizer: Send + Sync {
    async fn summarize(&self, report: &WorkflowStatusReport) -> Result<String, SummaryError>;
}

/// External text-completion service (an LLM behind an HTTP API).
///
/// No client ships in this workspace; deployments plug one in.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Deterministic summary built from the report itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateSummarizer;

#[async_trait]
impl CiSummarizer for TemplateSummarizer {
    async fn summarize(&self, report: &WorkflowStatusReport) -> Result<String, SummaryError> {
        Ok(render_status_update(report))
    }
}

/// Two-stage completion: analyze the status JSON, then condense the
/// analysis into a short team message.
pub struct PromptSummarizer<P> {
    provider: P,
}

impl<P: CompletionProvider> PromptSummarizer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: CompletionProvider> CiSummarizer for PromptSummarizer<P> {
    async fn summarize(&self, report: &WorkflowStatusReport) -> Result<String, SummaryError> {
        let analysis = self.provider.complete(&analysis_prompt(report)).await?;
        let message = self.provider.complete(&deployment_prompt(&analysis)).await?;
        if message.trim().is_empty() {
            return Err(SummaryError::Provider("empty completion".to_string()));
        }
        Ok(message)
    }
}

// ---------------------------------------------------------------------------
// StatusReporter
// ---------------------------------------------------------------------------

/// Queries workflow status, summarizes it, and hands it to a notifier.
#[derive(Clone)]
pub struct StatusReporter {
    queries: EventQueryService,
    summarizer: Arc<dyn CiSummarizer>,
    notifier: Arc<dyn Notifier>,
}

impl StatusReporter {
    pub fn new(
        queries: EventQueryService,
        summarizer: Arc<dyn CiSummarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queries,
            summarizer,
            notifier,
        }
    }

    /// Run the pipeline, propagating the first failure.
    pub async fn try_send_status_update(&self) -> Result<(), ReportError> {
        let report = self.queries.workflow_status(None).await?;
        let text = self.summarizer.summarize(&report).await?;
        self.notifier.notify(&text).await?;
        Ok(())
    }

    /// Run the pipeline and describe the outcome as text.
    pub async fn send_status_update(&self) -> String {
        match self.try_send_status_update().await {
            Ok(()) => {
                tracing::info!("Status update delivered");
                SENT_MESSAGE.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status update not delivered");
                format!("❌ {e}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
