//! Error taxonomy shared across every layer of the coordinator.
//!
//! Kinds mirror the discriminators of the design's error handling section —
//! they are surfaced verbatim as the `kind` field of wire `error` events and
//! tool-result errors, so `ErrorKind` stays a small `Copy` enum independent of
//! the richer [`Error`] that carries context and an optional source.

use thiserror::Error;

/// Result type alias used throughout the coordinator.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable discriminator for an [`Error`], used in wire events so clients can
/// branch on error category without string-matching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ErrorKind {
    /// Referenced folder/file/session/subagent does not exist.
    NotFound,
    /// Duplicate folder registration.
    AlreadyRegistered,
    /// Input violates schema or a size/length cap.
    ValidationError,
    /// Resource belongs to a different `(userId, companyId)`.
    Unauthorized,
    /// Sub-agent recursion depth cap hit.
    RecursionDepthExceeded,
    /// Bash command matched the denylist, or a path fell outside the allow-list.
    ToolDenied,
    /// Embedding/vector store/LLM provider unreachable after retries.
    UpstreamUnavailable,
    /// Timeout or provider-signaled retryable error.
    Transient,
    /// Meta-store unavailable at startup; the process must terminate.
    Fatal,
    /// A second turn was requested while one was already in flight.
    Busy,
    /// The tool-call loop exceeded `MAX_TOOL_CALLS`.
    ToolCallLimitExceeded,
    /// Internal invariant violated; not expected to reach a caller in practice.
    Internal,
}

impl ErrorKind {
    /// Whether an operation in this kind is safe to retry automatically.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::UpstreamUnavailable | ErrorKind::Transient)
    }
}

/// The coordinator's unified error type.
///
/// Every variant carries an [`ErrorKind`] (via [`Error::kind`]) so that
/// callers at the orchestrator/tool boundary never need to pattern-match on
/// message text.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced resource does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// Human-readable description of the missing resource.
        resource: String,
    },

    /// Duplicate folder registration.
    #[error("already registered: {absolute_path}")]
    AlreadyRegistered {
        /// The absolute path that was already registered.
        absolute_path: String,
    },

    /// Input violates schema or a size/length cap.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },

    /// Resource belongs to a different `(userId, companyId)`.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Description of the authorization failure.
        message: String,
    },

    /// Sub-agent recursion depth cap hit.
    #[error("recursion depth exceeded: max {max_depth}")]
    RecursionDepthExceeded {
        /// The configured maximum depth.
        max_depth: u32,
    },

    /// Bash command matched the denylist, or a path fell outside the allow-list.
    #[error("tool denied: {reason}")]
    ToolDenied {
        /// Reason the tool invocation was denied.
        reason: String,
    },

    /// Embedding/vector store/LLM provider unreachable after retries were exhausted.
    #[error("upstream unavailable: {service}: {message}")]
    UpstreamUnavailable {
        /// The external service that failed.
        service: String,
        /// Description of the failure.
        message: String,
    },

    /// Timeout or provider-signaled retryable error, surfaced once retried.
    #[error("transient error: {service}: {message}")]
    Transient {
        /// The external service that failed.
        service: String,
        /// Description of the failure.
        message: String,
    },

    /// Meta-store unavailable at startup; the process must terminate.
    #[error("fatal: {message}")]
    Fatal {
        /// Description of the fatal condition.
        message: String,
    },

    /// A second turn was requested while one was already in flight.
    #[error("session busy: {session_id}")]
    Busy {
        /// The session that already has a turn in progress.
        session_id: String,
    },

    /// The tool-call loop exceeded `MAX_TOOL_CALLS`.
    #[error("tool call limit exceeded: max {max_calls}")]
    ToolCallLimitExceeded {
        /// The configured maximum number of tool calls per turn.
        max_calls: u32,
    },

    /// Internal invariant violated.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal failure.
        message: String,
    },

    /// I/O error from the filesystem layer.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O failure.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The stable [`ErrorKind`] discriminator for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyRegistered { .. } => ErrorKind::AlreadyRegistered,
            Error::Validation { .. } => ErrorKind::ValidationError,
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::RecursionDepthExceeded { .. } => ErrorKind::RecursionDepthExceeded,
            Error::ToolDenied { .. } => ErrorKind::ToolDenied,
            Error::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Error::Transient { .. } => ErrorKind::Transient,
            Error::Fatal { .. } => ErrorKind::Fatal,
            Error::Busy { .. } => ErrorKind::Busy,
            Error::ToolCallLimitExceeded { .. } => ErrorKind::ToolCallLimitExceeded,
            Error::Internal { .. } | Error::Io { .. } | Error::Json(_) => ErrorKind::Internal,
        }
    }

    /// Build a [`Error::NotFound`].
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Build a [`Error::AlreadyRegistered`].
    pub fn already_registered<S: Into<String>>(absolute_path: S) -> Self {
        Self::AlreadyRegistered {
            absolute_path: absolute_path.into(),
        }
    }

    /// Build a [`Error::Validation`].
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a [`Error::Unauthorized`].
    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Build a [`Error::ToolDenied`].
    pub fn tool_denied<S: Into<String>>(reason: S) -> Self {
        Self::ToolDenied {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::UpstreamUnavailable`].
    pub fn upstream_unavailable<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Build a [`Error::Transient`].
    pub fn transient<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Transient {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Build a [`Error::Fatal`].
    pub fn fatal<S: Into<String>>(message: S) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    /// Build a [`Error::Internal`].
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Build a [`Error::Io`] wrapping a `std::io::Error`.
    pub fn io<S: Into<String>>(message: S, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}
