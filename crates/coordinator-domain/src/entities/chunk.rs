//! The `IndexedFile` and `FileChunk` entities.

use chrono::{DateTime, Utc};

use crate::value_objects::{ChunkId, FileId, FolderId};

/// A single file under an [`crate::entities::IndexedFolder`] that has been
/// scanned at least once.
///
/// Invariant: `(folder_id, absolute_path)` is unique; `chunk_count` always
/// equals the number of [`FileChunk`] rows owned by this file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    /// Stable identifier, reused across content updates (see the `updated`
    /// transition in the Indexer's state machine).
    pub id: FileId,
    /// The owning folder.
    pub folder_id: FolderId,
    /// Absolute path on disk.
    pub absolute_path: String,
    /// Path relative to the folder root.
    pub relative_path: String,
    /// Classified language, or `None` for an unrecognized extension.
    pub language: Option<String>,
    /// SHA-256 content hash, hex-encoded.
    pub content_hash: String,
    /// Size in bytes.
    pub size: u64,
    /// Number of lines.
    pub line_count: u64,
    /// Number of chunks successfully embedded for this file.
    pub chunk_count: u32,
    /// When this file was last (re)indexed.
    pub indexed_at: DateTime<Utc>,
}

/// A line-bounded, contiguous slice of a file's text: the unit of embedding
/// and retrieval.
///
/// Invariant: a vector point keyed by `vector_id` exists in the code
/// collection whose payload mirrors this chunk's `(file_id, folder_id, path,
/// language, lines, content)`. That invariant may be briefly violated during
/// a failure and is reconciled by the next scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChunk {
    /// Stable identifier.
    pub id: ChunkId,
    /// The owning file.
    pub file_id: FileId,
    /// 0-based, dense chunk number within the file.
    pub chunk_number: u32,
    /// The chunk's text content.
    pub content: String,
    /// First line of the chunk, 1-indexed, inclusive.
    pub start_line: u64,
    /// Last line of the chunk, 1-indexed, inclusive.
    pub end_line: u64,
    /// The vector store point id, conventionally `"{file_id}_{chunk_number}"`.
    pub vector_id: String,
}

impl FileChunk {
    /// The conventional vector point id for a chunk of `file_id` at
    /// `chunk_number`, per the persisted state layout.
    #[must_use]
    pub fn vector_id_for(file_id: FileId, chunk_number: u32) -> String {
        format!("{file_id}_{chunk_number}")
    }
}
