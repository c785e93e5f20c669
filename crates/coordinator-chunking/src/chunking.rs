//! Line-bounded chunking.
//!
//! Partitions a file's text by lines into pieces whose line count and byte
//! count do not exceed configured maxima. Chunks never cross line
//! boundaries; each carries an inclusive `[start_line, end_line]`. Empty
//! files yield zero chunks. This is deliberately not AST-aware — the
//! specification calls for a pure line-bounded split, not semantic chunking.

use crate::error::{LanguageError, Result};

/// One line-bounded chunk of a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChunk {
    /// The chunk's text, including trailing newlines of every line but the last.
    pub content: String,
    /// First line, 1-indexed, inclusive.
    pub start_line: u64,
    /// Last line, 1-indexed, inclusive.
    pub end_line: u64,
}

/// Limits applied while splitting a file into chunks.
#[derive(Debug, Clone, Copy)]
pub struct ChunkLimits {
    /// Maximum number of lines per chunk.
    pub max_lines: usize,
    /// Maximum number of bytes per chunk.
    pub max_bytes: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            max_lines: 200,
            max_bytes: 16 * 1024,
        }
    }
}

/// Split `content` into line-bounded chunks obeying `limits`.
///
/// # Errors
///
/// Returns [`LanguageError::ChunkingFailed`] if `limits.max_lines` or
/// `limits.max_bytes` is zero (a zero limit can never be satisfied by a
/// non-empty line).
pub fn chunk_lines(content: &str, limits: ChunkLimits) -> Result<Vec<LineChunk>> {
    if limits.max_lines == 0 || limits.max_bytes == 0 {
        return Err(LanguageError::ChunkingFailed {
            path: String::new(),
            reason: "chunk limits must be non-zero".to_owned(),
        });
    }
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let mut chunks = Vec::new();
    let mut current_lines: Vec<&str> = Vec::new();
    let mut current_bytes = 0usize;
    let mut chunk_start_line = 1u64;
    let mut line_no = 0u64;

    // `str::lines` drops the trailing newline; track whether the source ends
    // with one so the last chunk's content is reconstructed faithfully.
    let ends_with_newline = content.ends_with('\n');
    let total_lines = content.lines().count() as u64;

    for line in content.lines() {
        line_no += 1;
        let line_bytes = line.len() + 1; // + newline, trimmed back for the final chunk below.

        let would_overflow_lines = current_lines.len() + 1 > limits.max_lines;
        let would_overflow_bytes = !current_lines.is_empty() && current_bytes + line_bytes > limits.max_bytes;

        if would_overflow_lines || would_overflow_bytes {
            chunks.push(flush_chunk(
                &current_lines,
                chunk_start_line,
                line_no - 1,
                ends_with_newline || line_no - 1 < total_lines,
            ));
            current_lines.clear();
            current_bytes = 0;
            chunk_start_line = line_no;
        }

        current_lines.push(line);
        current_bytes += line_bytes;
    }

    if !current_lines.is_empty() {
        chunks.push(flush_chunk(
            &current_lines,
            chunk_start_line,
            line_no,
            ends_with_newline,
        ));
    }

    Ok(chunks)
}

fn flush_chunk(lines: &[&str], start_line: u64, end_line: u64, trailing_newline: bool) -> LineChunk {
    let mut content = lines.join("\n");
    if trailing_newline {
        content.push('\n');
    }
    LineChunk {
        content,
        start_line,
        end_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_zero_chunks() {
        let chunks = chunk_lines("", ChunkLimits::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn chunks_do_not_cross_line_boundaries_and_max_lines_is_honored() {
        let content = (1..=12)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let limits = ChunkLimits {
            max_lines: 5,
            max_bytes: 1 << 20,
        };
        let chunks = chunk_lines(&content, limits).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 5);
        assert_eq!(chunks[1].start_line, 6);
        assert_eq!(chunks[1].end_line, 10);
        assert_eq!(chunks[2].start_line, 11);
        assert_eq!(chunks[2].end_line, 12);
    }

    #[test]
    fn byte_cap_splits_before_line_cap_when_lines_are_long() {
        let content = format!("{}\n{}\n{}", "a".repeat(50), "b".repeat(50), "c".repeat(50));
        let limits = ChunkLimits {
            max_lines: 100,
            max_bytes: 60,
        };
        let chunks = chunk_lines(&content, limits).unwrap();
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.content.len() <= 60);
        }
    }

    #[test]
    fn zero_limits_are_rejected() {
        let limits = ChunkLimits {
            max_lines: 0,
            max_bytes: 100,
        };
        assert!(chunk_lines("a\nb", limits).is_err());
    }

    #[test]
    fn three_lines_exactly_at_max_lines_is_one_chunk() {
        let content = "a\nb\nc";
        let limits = ChunkLimits {
            max_lines: 3,
            max_bytes: 1 << 20,
        };
        let chunks = chunk_lines(content, limits).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 3);
    }
}
