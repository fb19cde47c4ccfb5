//! Configuration for the retrieval store.

use std::path::PathBuf;

/// Configuration for a [`RagStore`](crate::RagStore) instance.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Directory holding the persisted index database.
    pub index_dir: PathBuf,
    /// Minimum similarity score for search results.
    pub similarity_threshold: f32,
    /// Default number of results to return.
    pub default_top_k: usize,
    /// Whether to skip chunks whose content already exists in the index.
    pub deduplication: bool,
    /// Whether to persist automatically after batch indexing.
    pub auto_save: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from(".aadhaar_index"),
            similarity_threshold: 0.0,
            default_top_k: 3,
            deduplication: true,
            auto_save: true,
        }
    }
}

impl RagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }
}

/// Builder for retrieval configuration.
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the index persistence directory.
    #[must_use]
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    /// Sets the minimum similarity threshold for search results.
    #[must_use]
    pub const fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Sets the default number of results to return.
    #[must_use]
    pub const fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Enables or disables content deduplication.
    #[must_use]
    pub const fn deduplication(mut self, enabled: bool) -> Self {
        self.config.deduplication = enabled;
        self
    }

    /// Enables or disables automatic saving after batch indexing.
    #[must_use]
    pub const fn auto_save(mut self, enabled: bool) -> Self {
        self.config.auto_save = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}
