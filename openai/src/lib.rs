//! OpenAI-compatible client for the Aadhaar chat agent, built on `reqwest`
//! and the shared `aadhaar-core` abstractions.
//!
//! One [`OpenAI`] value implements both
//! [`ChatModel`](aadhaar_core::ChatModel) and
//! [`EmbeddingModel`](aadhaar_core::EmbeddingModel), so the same credential
//! and base URL drive completions and embeddings.
//!
//! ```no_run
//! use aadhaar_core::{ChatModel, Message};
//! use aadhaar_openai::OpenAI;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let model = OpenAI::new(std::env::var("OPENAI_API_KEY")?)
//!     .with_model("gpt-4o-mini");
//!
//! let answer = model
//!     .complete(&[
//!         Message::system("You are a concise assistant."),
//!         Message::user("What is Aadhaar?"),
//!     ])
//!     .await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

mod chat;
mod client;
mod embedding;
mod error;

pub use client::{Builder, OpenAI, RetryConfig};
pub use error::OpenAIError;

mod constant;
pub use constant::*;

pub(crate) const DEFAULT_MODEL: &str = GPT4O_MINI;
pub(crate) const DEFAULT_BASE_URL: &str = OPENAI_BASE_URL;
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = EMBEDDING_SMALL;
pub(crate) const DEFAULT_EMBEDDING_DIM: usize = 1536;
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 1000;
pub(crate) const DEFAULT_TEMPERATURE: f32 = 0.7;
