//! Summarisation: fit the paper text into the token budget, fill the prompt,
//! and call the completion service.
//!
//! ## Truncation
//!
//! While the content is over budget, keep only its first half (by character
//! count). This is coarse on purpose: it never cuts at a token or sentence
//! boundary and may discard far more than needed, but each pass halves the
//! length so it always terminates, after at most ⌈log₂ n⌉ passes when a
//! single character fits the budget.
//!
//! ## Failures
//!
//! There is no retry. An error from the service is returned as-is and the
//! orchestrator decides whether it aborts the run.

use crate::config::DigestConfig;
use crate::error::DigestError;
use crate::pipeline::tokens::{count_tokens, Encoding};
use crate::prompts::summary_prompt;
use edgequake_llm::{ChatMessage, LLMProvider, OpenAIProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A text-in, text-out completion endpoint.
pub trait CompletionService {
    /// Send `prompt` as a single user message and return the reply text.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, DigestError>> + Send;
}

/// [`CompletionService`] backed by an edgequake-llm provider.
#[derive(Clone)]
pub struct LlmCompletion {
    provider: Arc<dyn LLMProvider>,
}

impl LlmCompletion {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Build the provider described by `config`.
    ///
    /// 1. **Named provider** (`config.provider_name`): created through
    ///    [`ProviderFactory::create_llm_provider`], which reads that
    ///    provider's own API key variable.
    /// 2. **Default**: OpenAI with `config.api_key` and `config.model`.
    pub fn from_config(config: &DigestConfig) -> Result<Self, DigestError> {
        if let Some(ref name) = config.provider_name {
            let provider = ProviderFactory::create_llm_provider(name, &config.model).map_err(
                |e| DigestError::ProviderNotConfigured {
                    provider: name.clone(),
                    hint: format!("{e}"),
                },
            )?;
            return Ok(Self::new(provider));
        }

        let key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(DigestError::MissingApiKey)?;
        let provider = OpenAIProvider::new(key).with_model(&config.model);
        Ok(Self::new(Arc::new(provider)))
    }
}

impl CompletionService for LlmCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, DigestError> {
        let messages = vec![ChatMessage::user(prompt)];
        let response = self
            .provider
            .chat(&messages, None)
            .await
            .map_err(|e| DigestError::LlmApiError {
                message: format!("{}", e),
            })?;
        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Result of [`truncate_to_budget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated<'a> {
    /// The kept prefix of the input.
    pub text: &'a str,
    /// How many times the content was halved.
    pub halvings: u32,
    /// Token count of `text`.
    pub tokens: usize,
}

/// Halve `text` until `count(text) <= budget`.
///
/// Halving keeps the first `chars / 2` characters, so multi-byte text is
/// never split inside a character.
pub fn truncate_to_budget<F>(
    text: &str,
    budget: usize,
    mut count: F,
) -> Result<Truncated<'_>, DigestError>
where
    F: FnMut(&str) -> Result<usize, DigestError>,
{
    let mut content = text;
    let mut halvings = 0;
    let mut tokens = count(content)?;

    while tokens > budget && !content.is_empty() {
        content = first_half(content);
        halvings += 1;
        tokens = count(content)?;
        debug!("Halved content to {} chars ({} tokens)", content.chars().count(), tokens);
    }

    Ok(Truncated {
        text: content,
        halvings,
        tokens,
    })
}

fn first_half(s: &str) -> &str {
    let keep = s.chars().count() / 2;
    match s.char_indices().nth(keep) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// What a summarisation produced.
#[derive(Debug, Clone)]
pub struct Summary {
    /// The service's reply, verbatim.
    pub markdown: String,
    /// The content actually embedded in the prompt.
    pub prompt_content: String,
    /// Token count of `prompt_content`.
    pub prompt_tokens: usize,
    /// Halvings applied to reach the budget.
    pub halvings: u32,
}

/// Truncates paper text to the budget and asks the completion service for a summary.
pub struct Summarizer<C> {
    service: C,
    token_budget: usize,
    encoding: Encoding,
}

impl<C: CompletionService> Summarizer<C> {
    pub fn new(service: C, config: &DigestConfig) -> Self {
        Self {
            service,
            token_budget: config.token_budget,
            encoding: config.encoding,
        }
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Summarise one paper.
    ///
    /// The markdown is returned exactly as the service produced it; the
    /// prompt's formatting instructions are not enforced.
    pub async fn summarize(&self, title: &str, full_text: &str) -> Result<Summary, DigestError> {
        let start = Instant::now();
        let encoding = self.encoding;
        let truncated = truncate_to_budget(full_text, self.token_budget, |s| {
            count_tokens(s, encoding)
        })?;
        if truncated.halvings > 0 {
            info!(
                "'{}': halved {} times to fit {} tokens",
                title, truncated.halvings, self.token_budget
            );
        }

        let prompt = summary_prompt(truncated.text);
        let markdown = self.service.complete(&prompt).await?;
        debug!("'{}': summarised in {:?}", title, start.elapsed());

        Ok(Summary {
            markdown,
            prompt_content: truncated.text.to_string(),
            prompt_tokens: truncated.tokens,
            halvings: truncated.halvings,
        })
    }
}
