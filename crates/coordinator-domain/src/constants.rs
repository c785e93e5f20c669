//! Recommended defaults named by the specification. All are overridable via
//! configuration (see `coordinator-infrastructure::config`).

/// Default debounce window, per the `FileWatcher`/`Debouncer` pairing.
pub const DEBOUNCE_MS: u64 = 500;

/// Default bound on tool-call-loop iterations per turn.
pub const MAX_TOOL_CALLS: u32 = 10;

/// Default sub-agent recursion depth cap.
pub const SUBAGENT_MAX_DEPTH: u32 = 3;

/// Default chunk size for splitting large tool outputs, in bytes.
pub const CHUNK_SIZE: usize = 4096;

/// Default threshold above which a tool result is delivered chunked rather
/// than as a single `tool_result`, in bytes.
pub const TOOL_RESULT_CHUNK_THRESHOLD: usize = 10 * 1024;

/// Default bash tool deadline, in seconds.
pub const BASH_TIMEOUT_SECS: u64 = 30;

/// Default embedding call timeout, in seconds.
pub const EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Default vector store call timeout, in seconds.
pub const VECTOR_STORE_TIMEOUT_SECS: u64 = 30;

/// Default LLM provider initial-connection timeout, in seconds.
pub const LLM_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-service health probe timeout, in seconds.
pub const HEALTH_PROBE_TIMEOUT_SECS: u64 = 2;

/// Read-tool size cap, in bytes (10 MiB).
pub const READ_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Write-tool size cap, in bytes (5 MiB).
pub const WRITE_FILE_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// `list_directory` tool entry cap.
pub const LIST_DIRECTORY_MAX_ENTRIES: usize = 1_000;

/// The single logical vector-store collection holding code chunks.
pub const CODE_COLLECTION: &str = "code_index";

/// Hardcoded directory names skipped by the `FileScanner` regardless of
/// configuration, in addition to hidden dot-directories.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    ".git",
    ".hg",
    ".svn",
    "dist",
    "build",
    "vendor",
    "__pycache__",
    ".venv",
];

/// System directories the `bash` tool refuses to touch, per the denylist.
pub const DENIED_SYSTEM_DIRS: &[&str] = &[
    "/etc", "/var", "/sys", "/usr/bin", "/usr/sbin", "/bin", "/sbin", "/proc", "/dev",
];
