//! The `IndexedFolder` entity.

use chrono::{DateTime, Utc};

use crate::value_objects::{FolderId, FolderStatus};

/// A filesystem root registered with the indexer.
///
/// Owned by the meta store. Created by [`crate::ports::services::Indexer::add_folder`];
/// updated by the indexer on every scan; destroyed by
/// [`crate::ports::services::Indexer::remove_folder`], which cascades to every file,
/// chunk, and vector point under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFolder {
    /// Stable identifier.
    pub id: FolderId,
    /// Absolute, normalized filesystem path — unique across all folders.
    pub absolute_path: String,
    /// Optional human-supplied description, set at registration.
    pub description: Option<String>,
    /// Current lifecycle status.
    pub status: FolderStatus,
    /// When the folder was registered.
    pub added_at: DateTime<Utc>,
    /// When the folder was last scanned, if ever.
    pub last_scanned_at: Option<DateTime<Utc>>,
    /// Number of indexed files as of the last scan.
    pub file_count: u64,
    /// The error message from the last scan, if `status == Error`.
    pub last_error: Option<String>,
}

impl IndexedFolder {
    /// Construct a freshly-registered folder: `status = Active`, no prior scan.
    #[must_use]
    pub fn register(absolute_path: String, description: Option<String>) -> Self {
        Self {
            id: FolderId::new(),
            absolute_path,
            description,
            status: FolderStatus::Active,
            added_at: Utc::now(),
            last_scanned_at: None,
            file_count: 0,
            last_error: None,
        }
    }
}
