//! Configuration loading via `figment`: environment variables layered over
//! an optional TOML file, following the flat env-var surface named in the
//! external interfaces section (`INDEX_ROOTS`, `PATH_MAPPINGS`, ...).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use coordinator_domain::constants::{
    CHUNK_SIZE, DEBOUNCE_MS, MAX_TOOL_CALLS, SUBAGENT_MAX_DEPTH, TOOL_RESULT_CHUNK_THRESHOLD,
};
use coordinator_domain::error::{Error, Result};

/// The coordinator's full runtime configuration, assembled from an optional
/// TOML file overlaid by environment variables (the environment always
/// wins).
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    /// Comma-separated folder paths to auto-register on start.
    #[serde(default)]
    pub index_roots: String,
    /// Whether to `Scan` every auto-registered folder with `fileCount == 0`.
    #[serde(default)]
    pub index_auto_scan: bool,
    /// Semicolon-separated `host=workspace` prefix pairs.
    #[serde(default)]
    pub path_mappings: String,
    /// Selector of the embedding provider (`"http"`, provider-specific).
    #[serde(default = "default_embedding")]
    pub embedding: String,
    /// Base URL of the embedding service, when `embedding == "http"`.
    pub embedding_base_url: Option<String>,
    /// Bearer token for the embedding service, if required.
    pub embedding_api_key: Option<String>,
    /// Embedding dimensionality, known at configuration time.
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Base URL of the vector store's HTTP API.
    pub vector_store_url: String,
    /// Bearer token for the vector store, if required.
    pub vector_store_api_key: Option<String>,
    /// Connection URI for the meta store (a `sqlite://` path).
    pub meta_store_uri: String,
    /// Base URL of the LLM provider.
    pub llm_provider_url: String,
    /// Bearer token for the LLM provider.
    pub llm_provider_api_key: Option<String>,
    /// Bound on tool-call-loop iterations per turn.
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: u32,
    /// Sub-agent recursion depth cap.
    #[serde(default = "default_subagent_max_depth")]
    pub subagent_max_depth: u32,
    /// Debounce coalescing window, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Size of each `tool_result_chunk` fragment, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Byte threshold above which a tool result is delivered chunked.
    #[serde(default = "default_tool_result_chunk_threshold")]
    pub tool_result_chunk_threshold: usize,
    /// Colon-separated path prefixes the file tools may touch.
    #[serde(default)]
    pub allowed_dirs: String,
}

fn default_embedding() -> String {
    "http".to_owned()
}

fn default_embedding_dimensions() -> usize {
    768
}

fn default_max_tool_calls() -> u32 {
    MAX_TOOL_CALLS
}

fn default_subagent_max_depth() -> u32 {
    SUBAGENT_MAX_DEPTH
}

fn default_debounce_ms() -> u64 {
    DEBOUNCE_MS
}

fn default_chunk_size() -> usize {
    CHUNK_SIZE
}

fn default_tool_result_chunk_threshold() -> usize {
    TOOL_RESULT_CHUNK_THRESHOLD
}

impl CoordinatorConfig {
    /// Load configuration from an optional TOML file at `config_path`,
    /// overlaid by environment variables (upper-cased field names, matching
    /// the names in the external interfaces section).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if required fields (`vector_store_url`,
    /// `meta_store_uri`, `llm_provider_url`) are missing, or the TOML file
    /// is malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::raw());
        figment
            .extract()
            .map_err(|err| Error::validation(format!("failed to load configuration: {err}")))
    }

    /// Parse `index_roots` into the list of paths to auto-register.
    #[must_use]
    pub fn index_root_paths(&self) -> Vec<PathBuf> {
        split_nonempty(&self.index_roots, ',').map(PathBuf::from).collect()
    }

    /// Parse `path_mappings` into `(host, workspace)` prefix pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if an entry is not of the form
    /// `host=workspace`.
    pub fn path_mapping_pairs(&self) -> Result<Vec<(String, String)>> {
        split_nonempty(&self.path_mappings, ';')
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(host, workspace)| (host.to_owned(), workspace.to_owned()))
                    .ok_or_else(|| {
                        Error::validation(format!(
                            "PATH_MAPPINGS entry '{entry}' is not of the form host=workspace"
                        ))
                    })
            })
            .collect()
    }

    /// Parse `allowed_dirs` into the colon-separated path-prefix list.
    #[must_use]
    pub fn allowed_dir_paths(&self) -> Vec<PathBuf> {
        split_nonempty(&self.allowed_dirs, ':').map(PathBuf::from).collect()
    }
}

fn split_nonempty(value: &str, separator: char) -> impl Iterator<Item = &str> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> CoordinatorConfig {
        CoordinatorConfig {
            index_roots: String::new(),
            index_auto_scan: false,
            path_mappings: String::new(),
            embedding: default_embedding(),
            embedding_base_url: None,
            embedding_api_key: None,
            embedding_dimensions: default_embedding_dimensions(),
            vector_store_url: "http://localhost:6333".to_owned(),
            vector_store_api_key: None,
            meta_store_uri: "sqlite://coordinator.db".to_owned(),
            llm_provider_url: "http://localhost:8080".to_owned(),
            llm_provider_api_key: None,
            max_tool_calls: default_max_tool_calls(),
            subagent_max_depth: default_subagent_max_depth(),
            debounce_ms: default_debounce_ms(),
            chunk_size: default_chunk_size(),
            tool_result_chunk_threshold: default_tool_result_chunk_threshold(),
            allowed_dirs: String::new(),
        }
    }

    #[test]
    fn index_roots_splits_and_trims_on_comma() {
        let mut config = minimal_config();
        config.index_roots = "/a/b, /c/d ,,/e".to_owned();
        assert_eq!(
            config.index_root_paths(),
            vec![PathBuf::from("/a/b"), PathBuf::from("/c/d"), PathBuf::from("/e")]
        );
    }

    #[test]
    fn path_mappings_parses_host_equals_workspace_pairs() {
        let mut config = minimal_config();
        config.path_mappings = "/host/a=/workspace/a;/host/b=/workspace/b".to_owned();
        let pairs = config.path_mapping_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("/host/a".to_owned(), "/workspace/a".to_owned()),
                ("/host/b".to_owned(), "/workspace/b".to_owned()),
            ]
        );
    }

    #[test]
    fn malformed_path_mapping_entry_is_rejected() {
        let mut config = minimal_config();
        config.path_mappings = "not-a-pair".to_owned();
        assert!(config.path_mapping_pairs().is_err());
    }
}
