use std::sync::Arc;
use std::time::Duration;

use cirelay_db::EventRepository;
use cirelay_events::{EventForwarder, EventQueryService, SlackNotifier, StatusReporter, TemplateSummarizer};
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::ingest::Ingestor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The event log shared by the ingestor and the query service.
    pub store: Arc<dyn EventRepository>,
    /// Webhook ingestion (sync or deferred append, optional forward).
    pub ingestor: Ingestor,
    /// Read side over the event log.
    pub queries: EventQueryService,
    /// Status update pipeline posting to Slack.
    pub reporter: StatusReporter,
    /// Deferred appends and forwards, drained on shutdown.
    pub tasks: TaskTracker,
}

impl AppState {
    /// Wire the ingestor, query service, and reporter around `store`.
    pub fn new(config: ServerConfig, store: Arc<dyn EventRepository>) -> Result<Self, StartupError> {
        let tasks = TaskTracker::new();

        let mut ingestor = Ingestor::new(Arc::clone(&store), config.ingest_mode, tasks.clone());
        if let Some(url) = &config.forward_url {
            let forwarder = EventForwarder::new(
                url.clone(),
                Duration::from_secs(config.forward_timeout_secs),
            )?;
            ingestor = ingestor.with_forwarder(forwarder);
        }

        let queries = EventQueryService::new(Arc::clone(&store));
        let notifier = SlackNotifier::new(config.slack_webhook_url.clone())?;
        let reporter = StatusReporter::new(
            queries.clone(),
            Arc::new(TemplateSummarizer),
            Arc::new(notifier),
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            ingestor,
            queries,
            reporter,
            tasks,
        })
    }
}
