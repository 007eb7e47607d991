use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use tracing::{debug, info};
use crate::core::events::{DomainEvent, LendingEventType};
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;

// LogPublisher writes audit events to the tracing log and keeps their names so that the
// in-memory deployment can be inspected.
#[derive(Debug, Clone, Default)]
pub struct LogPublisher {
    published: Arc<RwLock<Vec<(String, String)>>>,
}

impl LogPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // (event name, key) pairs in publication order
    pub(crate) fn published(&self) -> Vec<(String, String)> {
        self.published.read().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn prepare(&mut self, kinds: &[LendingEventType]) -> LibraryResult<()> {
        debug!(kinds = kinds.len(), "log publisher accepts every event kind");
        Ok(())
    }

    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        info!(event = event.name.as_str(), key = event.key.as_str(), data = event.json_data.as_str(), "lending event");
        let mut published = self.published.write().map_err(|_| LibraryError::runtime(
            "log publisher lock poisoned", None))?;
        published.push((event.name.to_string(), event.key.to_string()));
        Ok(())
    }
}
