//! Bridges `notify`'s synchronous filesystem events into the async world,
//! classifies them, resolves the owning folder by longest-prefix match, and
//! dispatches debounced `(folder, path, op)` triples to the [`Indexer`].
//!
//! Subscription errors are logged and swallowed: per the watching contract,
//! a broken watch must never crash the process.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use coordinator_application::Indexer;
use coordinator_domain::entities::IndexedFolder;
use coordinator_domain::ports::MetaStore;
use coordinator_domain::value_objects::FolderId;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::debouncer::Debouncer;
use crate::path_mapper::PathMapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOp {
    Upsert,
    Delete,
}

fn classify(kind: &EventKind) -> Option<FileOp> {
    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(FileOp::Upsert),
        EventKind::Remove(_) => Some(FileOp::Delete),
        _ => None,
    }
}

/// Looks up the registered folder owning an absolute path, by longest
/// matching `absolute_path` prefix.
async fn owning_folder(meta_store: &dyn MetaStore, path: &Path) -> Option<IndexedFolder> {
    let path_str = path.to_string_lossy();
    let folders = meta_store.list_folders().await.ok()?;
    folders
        .into_iter()
        .filter(|folder| path_str.starts_with(folder.absolute_path.as_str()))
        .max_by_key(|folder| folder.absolute_path.len())
}

/// Owns a `notify` watch and a per-path [`Debouncer`], dispatching coalesced
/// filesystem changes into [`Indexer::index_file`] / [`Indexer::delete_file`].
pub struct NotifyFileWatcher {
    watcher: RecommendedWatcher,
    debouncer: Arc<Debouncer<PathBuf>>,
    path_mapper: PathMapper,
}

impl NotifyFileWatcher {
    /// Start the watcher's background dispatch task. `debounce_window` is
    /// the per-path coalescing window (`DEBOUNCE_MS` by default).
    ///
    /// `path_mapper` translates the workspace-real paths `notify` reports
    /// into the host-visible paths the rest of the system (folder
    /// registration, the `MetaStore`, the [`Indexer`]) deals in.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying OS watch subscription cannot be
    /// created.
    pub fn new(
        meta_store: Arc<dyn MetaStore>,
        indexer: Arc<Indexer>,
        debounce_window: Duration,
        path_mapper: PathMapper,
    ) -> notify::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(err) => warn!(error = %err, "file watcher subscription error"),
        })?;

        let debouncer = Arc::new(Debouncer::new(debounce_window));
        let dispatch_debouncer = Arc::clone(&debouncer);
        let dispatch_path_mapper = path_mapper.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(op) = classify(&event.kind) else { continue };
                for path in event.paths {
                    let meta_store = Arc::clone(&meta_store);
                    let indexer = Arc::clone(&indexer);
                    let is_file = path.is_file();
                    let host_path = dispatch_path_mapper.to_host(&path);
                    dispatch_debouncer.notify(host_path.clone(), async move {
                        if let Err(err) = dispatch(&*meta_store, &indexer, &host_path, is_file, op).await {
                            error!(path = %host_path.display(), error = %err, "indexing dispatch failed");
                        }
                    });
                }
            }
        });

        Ok(Self { watcher, debouncer, path_mapper })
    }

    /// Begin watching `root` recursively. Call once per registered folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be watched.
    pub fn watch_root(&mut self, root: &Path) -> notify::Result<()> {
        let workspace_root = self.path_mapper.to_workspace(root);
        self.watcher.watch(&workspace_root, RecursiveMode::Recursive)
    }

    /// Stop watching `root`. Idempotent; errors are logged, not propagated.
    pub fn unwatch_root(&mut self, root: &Path) {
        let workspace_root = self.path_mapper.to_workspace(root);
        if let Err(err) = self.watcher.unwatch(&workspace_root) {
            warn!(root = %root.display(), error = %err, "failed to unwatch folder root");
        }
    }

    /// Cancel every pending debounce timer without waiting for it to fire.
    pub fn cancel_all(&self) {
        self.debouncer.cancel_all();
    }
}

async fn dispatch(
    meta_store: &dyn MetaStore,
    indexer: &Indexer,
    path: &Path,
    is_file: bool,
    op: FileOp,
) -> coordinator_domain::error::Result<()> {
    let Some(folder) = owning_folder(meta_store, path).await else {
        return Ok(());
    };
    let folder_id: FolderId = folder.id;
    let absolute_path = path.to_string_lossy().into_owned();
    match op {
        FileOp::Upsert if is_file => indexer.index_file(folder_id, &absolute_path).await,
        FileOp::Upsert => Ok(()),
        FileOp::Delete => indexer.delete_file(folder_id, &absolute_path).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_modify_classify_as_upsert() {
        assert_eq!(classify(&EventKind::Create(notify::event::CreateKind::File)), Some(FileOp::Upsert));
        assert_eq!(
            classify(&EventKind::Modify(notify::event::ModifyKind::Data(
                notify::event::DataChange::Content
            ))),
            Some(FileOp::Upsert)
        );
    }

    #[test]
    fn remove_classifies_as_delete() {
        assert_eq!(classify(&EventKind::Remove(notify::event::RemoveKind::File)), Some(FileOp::Delete));
    }

    #[test]
    fn other_is_not_classified() {
        assert_eq!(classify(&EventKind::Other), None);
    }
}
