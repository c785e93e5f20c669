//! A publish-only sink for [`crate::events::DomainEvent`], independent of the
//! per-turn [`crate::ports::EventSink`]. Used by the `Indexer` to report scan
//! and file-indexing progress to whatever is listening (logs, a UI, metrics).

use async_trait::async_trait;

use crate::error::Result;
use crate::events::DomainEvent;

/// Publishes [`DomainEvent`]s. A failure to publish never aborts the
/// operation that raised the event — callers log and continue.
#[async_trait]
pub trait DomainEventPublisher: Send + Sync {
    /// Publish one event.
    async fn publish(&self, event: DomainEvent) -> Result<()>;
}
