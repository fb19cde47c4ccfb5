//! Chat completion abstraction.

use core::future::Future;

use crate::Message;

/// A model that produces an answer for an ordered conversation.
///
/// The error type is associated rather than erased so callers can match on
/// provider-specific failures (expired credentials, rate limits) and react
/// instead of only reporting.
pub trait ChatModel: Send + Sync {
    /// Provider-specific failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends the conversation and returns the assistant's reply text.
    ///
    /// `messages` is the full prompt in order, system turns included. The
    /// model does not retain state between calls; history management is the
    /// caller's concern.
    fn complete(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

impl<T: ChatModel> ChatModel for &T {
    type Error = T::Error;

    fn complete(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        (**self).complete(messages)
    }
}

impl<T: ChatModel> ChatModel for std::sync::Arc<T> {
    type Error = T::Error;

    fn complete(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        (**self).complete(messages)
    }
}
