//! `FileScanner` adapter: recursive, ignore-aware directory traversal that
//! classifies, hashes, and chunks every eligible regular file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coordinator_chunking::{chunk_lines, ChunkLimits, LanguageRegistry};
use coordinator_domain::constants::DEFAULT_IGNORED_DIRS;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::file_scanner::{FileScanner, ScannedChunk, ScannedFile};
use ignore::WalkBuilder;
use sha2::{Digest, Sha256};

use crate::path_mapper::PathMapper;

/// Walks a folder root with `ignore::WalkBuilder`, skipping
/// [`DEFAULT_IGNORED_DIRS`] and hidden dot-directories, classifying each
/// remaining regular file by extension and chunking its contents by line.
///
/// `path_mapper` translates the host-visible root/path the caller passes in
/// into the workspace-visible path the scanner actually reads from disk
/// (deployments where the indexer's filesystem view differs from the paths
/// folders are registered under), and translates every result's
/// `absolute_path` back to host terms before returning it.
pub struct WalkingFileScanner {
    languages: LanguageRegistry,
    limits: ChunkLimits,
    path_mapper: PathMapper,
}

impl WalkingFileScanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            languages: LanguageRegistry::new(),
            limits: ChunkLimits::default(),
            path_mapper: PathMapper::default(),
        }
    }

    #[must_use]
    pub fn with_limits(limits: ChunkLimits) -> Self {
        Self { languages: LanguageRegistry::new(), limits, path_mapper: PathMapper::default() }
    }

    /// Route every scan through `path_mapper`'s host/workspace translation.
    #[must_use]
    pub fn with_path_mapper(mut self, path_mapper: PathMapper) -> Self {
        self.path_mapper = path_mapper;
        self
    }
}

impl Default for WalkingFileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileScanner for WalkingFileScanner {
    async fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        let workspace_root = self.path_mapper.to_workspace(root);
        let languages = self.languages.clone();
        let limits = self.limits;
        let path_mapper = self.path_mapper.clone();
        let files = tokio::task::spawn_blocking(move || scan_blocking(&workspace_root, &languages, limits))
            .await
            .map_err(|err| Error::internal(format!("scan task panicked: {err}")))??;
        Ok(files.into_iter().map(|file| to_host_scanned_file(&path_mapper, file)).collect())
    }

    async fn scan_file(&self, root: &Path, path: &Path) -> Result<Option<ScannedFile>> {
        let workspace_root = self.path_mapper.to_workspace(root);
        let workspace_path = self.path_mapper.to_workspace(path);
        let languages = self.languages.clone();
        let limits = self.limits;
        let path_mapper = self.path_mapper.clone();
        let file = tokio::task::spawn_blocking(move || scan_one(&workspace_root, &workspace_path, &languages, limits))
            .await
            .map_err(|err| Error::internal(format!("scan task panicked: {err}")))??;
        Ok(file.map(|file| to_host_scanned_file(&path_mapper, file)))
    }
}

/// Rewrite a scanned file's `absolute_path` from the workspace-visible path
/// the scan actually read back to the host-visible path the rest of the
/// system (MetaStore rows, the watcher, folder registration) deals in.
fn to_host_scanned_file(path_mapper: &PathMapper, mut file: ScannedFile) -> ScannedFile {
    file.absolute_path = path_mapper.to_host(Path::new(&file.absolute_path)).to_string_lossy().into_owned();
    file
}

fn scan_blocking(root: &Path, languages: &LanguageRegistry, limits: ChunkLimits) -> Result<Vec<ScannedFile>> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .filter_entry(|entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry.file_name().to_str().is_none_or(|name| {
                !DEFAULT_IGNORED_DIRS.contains(&name) && !name.starts_with('.')
            })
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| Error::internal(format!("directory walk failed: {err}")))?;
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            if let Some(scanned) = scan_one(root, entry.path(), languages, limits)? {
                files.push(scanned);
            }
        }
    }
    Ok(files)
}

fn scan_one(
    root: &Path,
    path: &Path,
    languages: &LanguageRegistry,
    limits: ChunkLimits,
) -> Result<Option<ScannedFile>> {
    let Some(language) = languages.classify(path) else {
        return Ok(None);
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::io(format!("reading {}", path.display()), err)),
    };
    let Ok(content) = String::from_utf8(bytes) else {
        return Ok(None);
    };

    let relative_path = relative_path(root, path);
    let content_hash = hex::encode(Sha256::digest(content.as_bytes()));
    let line_count = content.lines().count() as u64;
    let size = content.len() as u64;

    let chunks = chunk_lines(&content, limits)
        .map_err(|err| Error::internal(format!("chunking {relative_path}: {err}")))?
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| ScannedChunk {
            chunk_number: index as u32,
            content: chunk.content,
            start_line: chunk.start_line,
            end_line: chunk.end_line,
        })
        .collect();

    Ok(Some(ScannedFile {
        relative_path,
        absolute_path: path.to_string_lossy().into_owned(),
        language: Some(language.name().to_owned()),
        size,
        line_count,
        content_hash,
        chunks,
    }))
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn scan_skips_ignored_dirs_and_unknown_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.rs", "fn main() {}\n");
        write(dir.path(), "image.png", "not-utf8-marker");
        write(dir.path(), "target/debug/build.rs", "should be skipped\n");

        let scanner = WalkingFileScanner::new();
        let mut files = scanner.scan(dir.path()).await.unwrap();
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "src/main.rs");
        assert_eq!(files[0].language.as_deref(), Some("rust"));
        assert_eq!(files[0].chunks.len(), 1);
    }

    #[tokio::test]
    async fn scan_file_returns_none_for_unrecognized_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "notes.txt", "hello\n");
        let scanner = WalkingFileScanner::new();
        assert!(scanner.scan_file(dir.path(), &path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scan_file_computes_a_stable_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.py", "x = 1\n");
        let scanner = WalkingFileScanner::new();
        let first = scanner.scan_file(dir.path(), &path).await.unwrap().unwrap();
        let second = scanner.scan_file(dir.path(), &path).await.unwrap().unwrap();
        assert_eq!(first.content_hash, second.content_hash);
    }
}
