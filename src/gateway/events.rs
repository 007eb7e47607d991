use async_trait::async_trait;
use crate::core::events::{DomainEvent, LendingEventType};
use crate::core::library::LibraryResult;

// EventPublisher is the history/audit collaborator the lending services report to
#[async_trait]
pub(crate) trait EventPublisher: Sync + Send {
    // readies delivery for the given kinds before the first publish
    async fn prepare(&mut self, kinds: &[LendingEventType]) -> LibraryResult<()>;
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()>;
}
