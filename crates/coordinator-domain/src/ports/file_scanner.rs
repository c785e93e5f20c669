//! The `FileScanner` port: walks a folder root and produces, for each
//! eligible regular file, the record the `Indexer` diffs against `MetaStore`.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// One line-bounded chunk observed by the scanner, prior to embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedChunk {
    /// 0-based, dense chunk number within the file.
    pub chunk_number: u32,
    /// The chunk's text content.
    pub content: String,
    /// First line, 1-indexed, inclusive.
    pub start_line: u64,
    /// Last line, 1-indexed, inclusive.
    pub end_line: u64,
}

/// One eligible regular file observed under a scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path relative to the folder root.
    pub relative_path: String,
    /// Absolute path on disk.
    pub absolute_path: String,
    /// Classified language, or `None` for an unrecognized extension.
    pub language: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Number of lines.
    pub line_count: u64,
    /// SHA-256 content hash, hex-encoded.
    pub content_hash: String,
    /// The file's line-bounded chunks. Empty for an empty file.
    pub chunks: Vec<ScannedChunk>,
}

/// Walks a folder root (or a single path within one) and classifies,
/// hashes, and chunks every eligible regular file.
///
/// Ignored directories (hardcoded defaults plus hidden dot-directories) and
/// unrecognized extensions are skipped without error; binary files (files
/// that fail a UTF-8 validity check at read time) are skipped as well.
#[async_trait]
pub trait FileScanner: Send + Sync {
    /// Walk `root` and return every eligible file found beneath it.
    async fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>>;

    /// Classify, hash, and chunk a single file. Returns `None` if `path` is
    /// ignored, has an unrecognized extension, or is binary.
    async fn scan_file(&self, root: &Path, path: &Path) -> Result<Option<ScannedFile>>;
}
