//! Well-known model identifiers and endpoints.

/// Default OpenAI REST endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// `gpt-4o-mini`: the fast, inexpensive chat model.
pub const GPT4O_MINI: &str = "gpt-4o-mini";

/// `gpt-4o`: the full-size chat model.
pub const GPT4O: &str = "gpt-4o";

/// `text-embedding-3-small`: 1536-dimension embeddings.
pub const EMBEDDING_SMALL: &str = "text-embedding-3-small";

/// `text-embedding-3-large`: 3072-dimension embeddings.
pub const EMBEDDING_LARGE: &str = "text-embedding-3-large";

/// `text-embedding-ada-002`: legacy 1536-dimension embeddings.
pub const EMBEDDING_ADA: &str = "text-embedding-ada-002";
