//! Structured logging bootstrap built on the `tracing` ecosystem: one
//! `fmt` subscriber, level controlled by `RUST_LOG` with a sane default.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global `tracing` subscriber. Safe to call once per
/// process; a second call is a no-op (the error is discarded).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init();
}

/// Parse a textual log level, defaulting to `info` for anything
/// unrecognized rather than failing startup over a typo'd env var.
#[must_use]
pub fn parse_log_level(raw: &str) -> tracing::Level {
    raw.parse().unwrap_or(tracing::Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_level_falls_back_to_info() {
        assert_eq!(parse_log_level("not-a-level"), tracing::Level::INFO);
    }

    #[test]
    fn recognized_level_is_parsed() {
        assert_eq!(parse_log_level("debug"), tracing::Level::DEBUG);
    }
}
