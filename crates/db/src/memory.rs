//! In-process event store with the same capacity rules as the file store.

use async_trait::async_trait;
use cirelay_core::Event;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::{evict_oldest, EventRepository};

/// Event store kept entirely in memory. Contents are lost with the process.
#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing log (oldest first), applying the capacity cap.
    pub fn with_events(mut events: Vec<Event>) -> Self {
        evict_oldest(&mut events);
        Self {
            events: Mutex::new(events),
        }
    }
}

#[async_trait]
impl EventRepository for MemoryEventStore {
    async fn append(&self, event: Event) -> Result<(), StoreError> {
        let mut events = self.events.lock().await;
        events.push(event);
        evict_oldest(&mut events);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.lock().await.clone())
    }
}
