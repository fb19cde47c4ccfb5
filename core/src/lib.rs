//! Trait abstractions shared by the Aadhaar chat agent crates.
//!
//! This crate hosts the provider-agnostic seams of the system:
//!
//! - [`Message`] / [`Role`] — conversation turns exchanged with a model.
//! - [`EmbeddingModel`] — convert text into dense vectors for retrieval.
//! - [`ChatModel`] — produce an answer from an ordered message sequence.
//!
//! Provider crates implement these traits; everything above them (the RAG
//! store, the session loop) is written against the traits so that tests can
//! substitute deterministic fakes.

pub mod chat;
pub mod embedding;
pub mod message;

#[doc(inline)]
pub use chat::ChatModel;
#[doc(inline)]
pub use embedding::EmbeddingModel;
#[doc(inline)]
pub use message::{Message, Role};

/// Result type used by embedding implementations.
pub type Result<T> = anyhow::Result<T>;

pub use anyhow::Error;
