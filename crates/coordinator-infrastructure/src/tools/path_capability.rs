//! A small capability object encapsulating `ALLOWED_DIRS`: file tools consume
//! it to validate a path instead of sprinkling ad hoc prefix checks.

use std::path::{Path, PathBuf};

use coordinator_domain::error::{Error, Result};

/// Grants file operations only under a configured set of prefixes. An empty
/// allow-list means unrestricted (the default when `ALLOWED_DIRS` is unset).
#[derive(Debug, Clone)]
pub struct PathCapability {
    allowed_prefixes: Vec<PathBuf>,
}

impl PathCapability {
    /// Build a capability over the given allow-list.
    #[must_use]
    pub fn new(allowed_prefixes: Vec<PathBuf>) -> Self {
        Self { allowed_prefixes }
    }

    /// Validate and canonicalize-free normalize `requested` against this
    /// capability's allow-list, rejecting `..` traversal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolDenied`] if `requested` contains a `..` segment
    /// or falls outside every allowed prefix.
    pub fn validate(&self, requested: &str) -> Result<PathBuf> {
        let path = PathBuf::from(requested);
        if path.components().any(|component| component == std::path::Component::ParentDir) {
            return Err(Error::tool_denied(format!("path '{requested}' contains a '..' segment")));
        }
        if self.allowed_prefixes.is_empty() {
            return Ok(path);
        }
        if self.allowed_prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            return Ok(path);
        }
        Err(Error::tool_denied(format!("path '{requested}' is outside the allowed directories")))
    }
}

/// Whether `path` falls under one of the denylisted system directories, for
/// the `bash` tool's directory denylist.
#[must_use]
pub fn touches_denied_system_dir(path: &Path) -> bool {
    coordinator_domain::constants::DENIED_SYSTEM_DIRS
        .iter()
        .any(|denied| path.starts_with(denied))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_permits_any_path() {
        let capability = PathCapability::new(vec![]);
        assert!(capability.validate("/anywhere/at/all.rs").is_ok());
    }

    #[test]
    fn parent_dir_segment_is_always_rejected() {
        let capability = PathCapability::new(vec![PathBuf::from("/workspace")]);
        assert!(capability.validate("/workspace/../etc/passwd").is_err());
    }

    #[test]
    fn path_outside_every_prefix_is_rejected() {
        let capability = PathCapability::new(vec![PathBuf::from("/workspace")]);
        assert!(capability.validate("/other/file.rs").is_err());
        assert!(capability.validate("/workspace/src/lib.rs").is_ok());
    }

    #[test]
    fn denied_system_dir_is_detected() {
        assert!(touches_denied_system_dir(Path::new("/etc/passwd")));
        assert!(!touches_denied_system_dir(Path::new("/home/user/file.rs")));
    }
}
