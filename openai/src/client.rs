use std::{sync::Arc, time::Duration};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, error::OpenAIError,
};

/// Configuration for request retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate delay for a given attempt number (0-indexed).
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

/// Check if an error is retryable.
const fn is_retryable_error(err: &OpenAIError) -> bool {
    match err {
        // Rate limit, server failures, timeouts, and transport errors are
        // transient.
        OpenAIError::RateLimit { .. }
        | OpenAIError::Server { .. }
        | OpenAIError::Timeout
        | OpenAIError::Http(_) => true,
        // Auth failures, contract violations, and parse errors are not.
        OpenAIError::Auth(_) | OpenAIError::Api(_) | OpenAIError::Json(_) => false,
    }
}

/// Get retry delay for an error, respecting `Retry-After` for rate limits.
fn get_retry_delay(err: &OpenAIError, attempt: u32, config: &RetryConfig) -> Duration {
    if let OpenAIError::RateLimit {
        retry_after: Some(delay),
    } = err
    {
        return (*delay).min(config.max_delay);
    }
    config.delay_for_attempt(attempt)
}

/// Client for OpenAI-compatible chat completion and embedding endpoints.
#[derive(Clone, Debug)]
pub struct OpenAI {
    inner: Arc<Config>,
}

impl OpenAI {
    /// Create a new client using the provided API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(api_key).build()
    }

    /// Start building an [`OpenAI`] client with custom configuration.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> Builder {
        Builder::new(api_key)
    }

    /// Override the default chat model in-place.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).chat_model = sanitize_model(model);
        self
    }

    /// Override the REST base URL (useful for OpenAI-compatible endpoints).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).base_url = base_url.into();
        self
    }

    pub(crate) fn config(&self) -> Arc<Config> {
        self.inner.clone()
    }
}

/// Builder for [`OpenAI`] clients.
#[derive(Debug)]
pub struct Builder {
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimensions: usize,
    max_tokens: u32,
    temperature: f32,
    retry: RetryConfig,
    request_timeout: Duration,
}

/// Default request timeout. The original service had none; a bounded wait
/// surfaces as [`OpenAIError::Timeout`] instead of hanging the session.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

impl Builder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIM,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            retry: RetryConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Select a chat model identifier (e.g., `gpt-4o-mini`).
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = sanitize_model(model);
        self
    }

    /// Select the embeddings model identifier.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        let model = sanitize_model(model);
        if let Some(dim) = infer_embedding_dim(&model) {
            self.embedding_dimensions = dim;
        }
        self.embedding_model = model;
        self
    }

    /// Override the embedding vector dimension.
    #[must_use]
    pub const fn embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self
    }

    /// Set the completion token budget.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Configure retry behavior for failed requests.
    ///
    /// By default a request is retried once with exponential backoff.
    /// Retries happen on transport errors, timeouts, and HTTP 429/5xx.
    #[must_use]
    pub const fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set maximum number of retry attempts.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Disable retries entirely.
    #[must_use]
    pub fn no_retry(mut self) -> Self {
        self.retry = RetryConfig::none();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Consume the builder and create an [`OpenAI`] client.
    ///
    /// # Panics
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn build(self) -> OpenAI {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .expect("failed to initialize HTTP client");
        OpenAI {
            inner: Arc::new(Config {
                api_key: self.api_key,
                base_url: self.base_url,
                chat_model: self.chat_model,
                embedding_model: self.embedding_model,
                embedding_dimensions: self.embedding_dimensions,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                retry: self.retry,
                http,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) chat_model: String,
    pub(crate) embedding_model: String,
    pub(crate) embedding_dimensions: usize,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f32,
    pub(crate) retry: RetryConfig,
    pub(crate) http: reqwest::Client,
}

impl Config {
    pub(crate) fn request_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn sanitize_model(model: impl Into<String>) -> String {
    model.into().trim().to_string()
}

fn infer_embedding_dim(model: &str) -> Option<usize> {
    match model {
        crate::EMBEDDING_LARGE => Some(3072),
        crate::EMBEDDING_SMALL | crate::EMBEDDING_ADA => Some(1536),
        _ => None,
    }
}

fn map_transport(err: reqwest::Error) -> OpenAIError {
    if err.is_timeout() {
        OpenAIError::Timeout
    } else {
        OpenAIError::Http(err)
    }
}

/// Maps a non-success HTTP status to the error taxonomy.
fn error_for_status(status: u16, retry_after: Option<Duration>, message: String) -> OpenAIError {
    match status {
        401 | 403 => OpenAIError::Auth(message),
        429 => OpenAIError::RateLimit { retry_after },
        500..=599 => OpenAIError::Server { status, message },
        _ => OpenAIError::Api(message),
    }
}

fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value?.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[derive(Debug, serde::Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn post_once<T: DeserializeOwned>(
    cfg: &Config,
    path: &str,
    body: &impl Serialize,
) -> Result<T, OpenAIError> {
    let response = cfg
        .http
        .post(cfg.request_url(path))
        .bearer_auth(&cfg.api_key)
        .json(body)
        .send()
        .await
        .map_err(map_transport)?;

    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(map_transport);
    }

    let retry_after = parse_retry_after(
        response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok()),
    );
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&raw)
        .map(|parsed| parsed.error.message)
        .unwrap_or(raw);

    Err(error_for_status(status.as_u16(), retry_after, message))
}

/// POSTs a JSON body, retrying transient failures per the client's
/// [`RetryConfig`].
pub(crate) async fn post_with_retry<T: DeserializeOwned>(
    cfg: &Config,
    path: &str,
    body: &impl Serialize,
) -> Result<T, OpenAIError> {
    let mut attempt = 0;
    loop {
        match post_once(cfg, path, body).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt < cfg.retry.max_retries && is_retryable_error(&err) {
                    let delay = get_retry_delay(&err, attempt, &cfg.retry);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = cfg.retry.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                } else {
                    return Err(err);
                }
            }
        }
    }
}
