//! Event Store: the bounded, append-only log of normalized events.
//!
//! Callers depend on the [`EventRepository`] port; [`FileEventStore`] is the
//! production backend (one JSON array on disk) and [`MemoryEventStore`] backs
//! tests and ephemeral deployments.

pub mod error;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use cirelay_core::Event;

pub use error::StoreError;
pub use file::FileEventStore;
pub use memory::MemoryEventStore;

/// Maximum number of events retained; older events are evicted first.
pub const MAX_STORED_EVENTS: usize = 100;

/// Persistence port for the event log.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Append one event, evicting the oldest entries beyond
    /// [`MAX_STORED_EVENTS`].
    async fn append(&self, event: Event) -> Result<(), StoreError>;

    /// All stored events in append order (empty when nothing is stored).
    async fn load(&self) -> Result<Vec<Event>, StoreError>;
}

/// Drop the oldest events so at most [`MAX_STORED_EVENTS`] remain.
pub(crate) fn evict_oldest(events: &mut Vec<Event>) {
    if events.len() > MAX_STORED_EVENTS {
        let excess = events.len() - MAX_STORED_EVENTS;
        events.drain(..excess);
    }
}
