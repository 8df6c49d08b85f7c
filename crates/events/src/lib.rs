//! Read side and outbound delivery for the GitHub Actions event relay.
//!
//! - [`EventQueryService`]: recent events and latest status per workflow,
//!   read fresh from the [`EventRepository`](cirelay_db::EventRepository) on
//!   every call.
//! - [`delivery`]: outbound HTTP for the optional event forward mirror and the
//!   Slack notifier.
//! - [`report`]: turns the workflow status view into a team notification.

pub mod delivery;
pub mod query;
pub mod report;

pub use delivery::forward::{EventForwarder, ForwardError};
pub use delivery::slack::{Notifier, NotifyError, SlackNotifier};
pub use query::{EventQueryService, DEFAULT_RECENT_LIMIT};
pub use report::{
    CiSummarizer, CompletionProvider, PromptSummarizer, ReportError, StatusReporter,
    SummaryError, TemplateSummarizer,
};
