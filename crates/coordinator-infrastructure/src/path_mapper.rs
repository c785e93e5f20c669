//! Host-path to workspace-path translation, for deployments where the
//! coordinator runs inside a container or remote sandbox whose filesystem
//! paths differ from the ones a human reviewer sees.

use std::path::{Path, PathBuf};

/// An immutable table of `(host_prefix, workspace_prefix)` pairs, sorted by
/// descending host-prefix length so the longest (most specific) match wins.
#[derive(Debug, Clone, Default)]
pub struct PathMapper {
    pairs: Vec<(String, String)>,
}

impl PathMapper {
    /// Build a mapper from `(host, workspace)` pairs. Pairs are sorted
    /// internally; callers do not need to order them.
    #[must_use]
    pub fn new(mut pairs: Vec<(String, String)>) -> Self {
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { pairs }
    }

    /// Translate a host-visible path into its workspace-visible equivalent,
    /// by replacing the longest matching host prefix. Returns the input path
    /// unchanged if no prefix matches.
    #[must_use]
    pub fn to_workspace(&self, host_path: &Path) -> PathBuf {
        self.translate(host_path, |pair| (&pair.0, &pair.1))
    }

    /// The inverse of [`Self::to_workspace`]: translate a workspace-visible
    /// path back into its host-visible equivalent.
    #[must_use]
    pub fn to_host(&self, workspace_path: &Path) -> PathBuf {
        self.translate(workspace_path, |pair| (&pair.1, &pair.0))
    }

    fn translate(
        &self,
        path: &Path,
        select: impl Fn(&(String, String)) -> (&String, &String),
    ) -> PathBuf {
        let path_str = path.to_string_lossy();
        for pair in &self.pairs {
            let (from, to) = select(pair);
            if let Some(rest) = path_str.strip_prefix(from.as_str()) {
                return PathBuf::from(format!("{to}{rest}"));
            }
        }
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let mapper = PathMapper::new(vec![
            ("/host".to_owned(), "/ws/general".to_owned()),
            ("/host/special".to_owned(), "/ws/special".to_owned()),
        ]);
        assert_eq!(
            mapper.to_workspace(Path::new("/host/special/file.rs")),
            PathBuf::from("/ws/special/file.rs")
        );
        assert_eq!(
            mapper.to_workspace(Path::new("/host/other/file.rs")),
            PathBuf::from("/ws/general/other/file.rs")
        );
    }

    #[test]
    fn unmapped_path_is_returned_unchanged() {
        let mapper = PathMapper::new(vec![("/host".to_owned(), "/ws".to_owned())]);
        assert_eq!(
            mapper.to_workspace(Path::new("/elsewhere/file.rs")),
            PathBuf::from("/elsewhere/file.rs")
        );
    }

    #[test]
    fn to_host_is_the_inverse_of_to_workspace() {
        let mapper = PathMapper::new(vec![("/host".to_owned(), "/ws".to_owned())]);
        let host = Path::new("/host/a/b.rs");
        let workspace = mapper.to_workspace(host);
        assert_eq!(mapper.to_host(&workspace), host);
    }
}
