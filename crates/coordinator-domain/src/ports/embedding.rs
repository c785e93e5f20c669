//! The `EmbeddingClient` port: a pure function from text to a fixed-dimension
//! vector.

use async_trait::async_trait;

use crate::error::Result;

/// Pluggable embedding provider (local HTTP service, remote API, on-device
/// library — the interface is identical either way).
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed `text`, returning a vector of [`EmbeddingClient::dimensions`] floats.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::UpstreamUnavailable`] or
    /// [`crate::error::Error::Transient`] on failure.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The fixed dimensionality this client produces, known at configuration time.
    fn dimensions(&self) -> usize;
}
