use crate::config::{generate_options::GenerateOptions, llm_provider::LlmProvider};

/// Configuration for an LLM model invocation.
///
/// - `provider`: which backend to use (Ollama, OpenAI).
/// - `model`: the model identifier (e.g. `"gpt-4o-mini"`, `"qwen3:14b"`).
/// - `endpoint`: base URL of the inference server.
/// - `api_key`: optional API key for providers that require authentication.
/// - `max_tokens`: default output budget.
/// - `temperature` / `top_p`: default sampling parameters.
/// - `timeout_secs`: optional request timeout in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Returns `(max_tokens, temperature)` with per-call overrides applied.
    pub fn sampling(&self, opts: &GenerateOptions) -> (Option<u32>, Option<f32>) {
        (
            opts.max_tokens.or(self.max_tokens),
            opts.temperature.or(self.temperature),
        )
    }
}
