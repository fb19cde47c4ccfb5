//! Text embedding abstraction.

use core::future::Future;

/// A model that converts text into dense vectors.
///
/// Implementations must be cheap to clone or share behind an `Arc`; the
/// retrieval store embeds documents and queries through the same instance so
/// that both live in one vector space.
pub trait EmbeddingModel: Send + Sync {
    /// Dimensionality of the vectors this model produces.
    ///
    /// Every vector returned by [`embed`](Self::embed) has exactly this
    /// length.
    fn dim(&self) -> usize;

    /// Embeds a single piece of text.
    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send;
}

impl<T: EmbeddingModel> EmbeddingModel for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send {
        (**self).embed(text)
    }
}

impl<T: EmbeddingModel> EmbeddingModel for std::sync::Arc<T> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send {
        (**self).embed(text)
    }
}
