//! A [`DomainEventPublisher`] that logs every event via `tracing`, for
//! deployments with no other event bus wired up.

use async_trait::async_trait;
use coordinator_domain::error::Result;
use coordinator_domain::events::DomainEvent;
use coordinator_domain::ports::DomainEventPublisher;
use tracing::info;

/// Publishes [`DomainEvent`]s as structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDomainEventPublisher;

impl TracingDomainEventPublisher {
    /// Construct a new publisher. Stateless; cheap to clone or share.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DomainEventPublisher for TracingDomainEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<()> {
        match event {
            DomainEvent::ScanStarted { folder_id, at } => {
                info!(%folder_id, %at, "scan started");
            }
            DomainEvent::ScanCompleted { folder_id, new_files, updated_files, missing_files, at } => {
                info!(%folder_id, new_files, updated_files, missing_files, %at, "scan completed");
            }
            DomainEvent::ScanFailed { folder_id, message, at } => {
                info!(%folder_id, message, %at, "scan failed");
            }
            DomainEvent::FileIndexed { folder_id, relative_path, chunk_count } => {
                info!(%folder_id, relative_path, chunk_count, "file indexed");
            }
            DomainEvent::FileRemoved { folder_id, relative_path } => {
                info!(%folder_id, relative_path, "file removed");
            }
        }
        Ok(())
    }
}
