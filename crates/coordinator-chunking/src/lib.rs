//! # Chunking layer
//!
//! Pure-function file language classification and line-bounded chunking.
//! No AST parsing, no network or disk I/O beyond reading the bytes the
//! caller hands in.

pub mod chunking;
pub mod error;
pub mod language;

pub use chunking::{chunk_lines, ChunkLimits, LineChunk};
pub use error::{LanguageError, Result};
pub use language::{LanguageId, LanguageRegistry};
