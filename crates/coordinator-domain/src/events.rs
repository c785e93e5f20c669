//! Domain events published by the indexer, independent of the wire events
//! `EventSink` carries to the UI during a chat turn.

use chrono::{DateTime, Utc};

use crate::value_objects::FolderId;

/// An event describing a change in indexing progress, suitable for an
/// internal event bus or for driving `IndexedFolder.status` transitions.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A scan started for a folder.
    ScanStarted {
        /// The folder being scanned.
        folder_id: FolderId,
        /// When the scan started.
        at: DateTime<Utc>,
    },
    /// A scan completed for a folder.
    ScanCompleted {
        /// The folder that was scanned.
        folder_id: FolderId,
        /// Number of files observed as new.
        new_files: u64,
        /// Number of files observed as updated.
        updated_files: u64,
        /// Number of files observed as missing.
        missing_files: u64,
        /// When the scan completed.
        at: DateTime<Utc>,
    },
    /// A scan failed fatally.
    ScanFailed {
        /// The folder that failed to scan.
        folder_id: FolderId,
        /// The failure message.
        message: String,
        /// When the failure was observed.
        at: DateTime<Utc>,
    },
    /// A single file finished indexing (new or updated).
    FileIndexed {
        /// The folder owning the file.
        folder_id: FolderId,
        /// The file's relative path.
        relative_path: String,
        /// Number of chunks successfully embedded.
        chunk_count: u32,
    },
    /// A single file was removed from the index.
    FileRemoved {
        /// The folder owning the file.
        folder_id: FolderId,
        /// The file's relative path.
        relative_path: String,
    },
}
