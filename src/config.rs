//! Configuration for a digest run.
//!
//! Every knob lives in [`DigestConfig`], built once at startup via
//! [`DigestConfigBuilder`] and never mutated afterwards. The API key is part
//! of the config rather than process-wide state: the summarizer receives it at
//! construction and nothing re-reads the environment mid-run.

use crate::error::DigestError;
use crate::pipeline::tokens::Encoding;
use std::fmt;
use std::path::PathBuf;

/// Default arXiv export API endpoint.
pub const DEFAULT_FEED_URL: &str = "https://export.arxiv.org/api/query";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-16k";

/// Context window of [`DEFAULT_MODEL`], in tokens.
pub const DEFAULT_TOKEN_BUDGET: usize = 16_385;

/// Configuration for one digest run.
///
/// # Example
/// ```rust
/// use edgequake_arxiv_digest::DigestConfig;
///
/// let config = DigestConfig::builder()
///     .api_key("sk-test")
///     .max_results(3)
///     .output_root("/tmp/digest")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_results, 3);
/// ```
#[derive(Clone)]
pub struct DigestConfig {
    /// Completion-service API key. Read from `OPENAI_API_KEY` by [`DigestConfig::from_env`].
    pub api_key: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    ///
    /// When set, the provider is created through the provider factory, which
    /// reads its own credentials from the environment. When `None`, the OpenAI
    /// provider is built from [`DigestConfig::api_key`].
    pub provider_name: Option<String>,

    /// Completion model identifier. Default: `gpt-3.5-turbo-16k`.
    pub model: String,

    /// Maximum prompt-content size in tokens. Default: 16385.
    pub token_budget: usize,

    /// Tokenizer used to measure content against `token_budget`. Default: `cl100k_base`.
    pub encoding: Encoding,

    /// Feed offset of the first result. Default: 0.
    pub start: usize,

    /// Number of feed results to process. Default: 5.
    pub max_results: usize,

    /// Feed endpoint. Default: [`DEFAULT_FEED_URL`].
    pub feed_url: String,

    /// Directory under which `papers/`, `extract/` and `summary/` live. Default: `.`.
    pub output_root: PathBuf,

    /// Record a failing paper and move on instead of aborting the run. Default: false.
    pub continue_on_error: bool,

    /// Timeout for each feed and PDF request. Default: None (wait indefinitely).
    pub http_timeout_secs: Option<u64>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_name: None,
            model: DEFAULT_MODEL.to_string(),
            token_budget: DEFAULT_TOKEN_BUDGET,
            encoding: Encoding::default(),
            start: 0,
            max_results: 5,
            feed_url: DEFAULT_FEED_URL.to_string(),
            output_root: PathBuf::from("."),
            continue_on_error: false,
            http_timeout_secs: None,
        }
    }
}

impl fmt::Debug for DigestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("token_budget", &self.token_budget)
            .field("encoding", &self.encoding)
            .field("start", &self.start)
            .field("max_results", &self.max_results)
            .field("feed_url", &self.feed_url)
            .field("output_root", &self.output_root)
            .field("continue_on_error", &self.continue_on_error)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl DigestConfig {
    /// Create a new builder for `DigestConfig`.
    pub fn builder() -> DigestConfigBuilder {
        DigestConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus `OPENAI_API_KEY` from the process environment.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }
}

/// Builder for [`DigestConfig`].
#[derive(Debug)]
pub struct DigestConfigBuilder {
    config: DigestConfig,
}

impl DigestConfigBuilder {
    /// Start from an existing config instead of the defaults.
    pub fn from_config(config: DigestConfig) -> Self {
        Self { config }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn token_budget(mut self, tokens: usize) -> Self {
        self.config.token_budget = tokens;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.config.start = start;
        self
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.config.max_results = n;
        self
    }

    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.config.feed_url = url.into();
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn continue_on_error(mut self, v: bool) -> Self {
        self.config.continue_on_error = v;
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DigestConfig, DigestError> {
        let c = &self.config;
        if c.token_budget == 0 {
            return Err(DigestError::InvalidConfig(
                "Token budget must be ≥ 1".into(),
            ));
        }
        if c.max_results == 0 {
            return Err(DigestError::InvalidConfig(
                "Max results must be ≥ 1".into(),
            ));
        }
        if c.http_timeout_secs == Some(0) {
            return Err(DigestError::InvalidConfig(
                "HTTP timeout must be ≥ 1 second".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(DigestError::InvalidConfig("Model must not be empty".into()));
        }
        if reqwest::Url::parse(&c.feed_url).is_err() {
            return Err(DigestError::InvalidConfig(format!(
                "Feed URL is not a valid URL: '{}'",
                c.feed_url
            )));
        }
        Ok(self.config)
    }
}
