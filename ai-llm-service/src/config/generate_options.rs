/// Per-call overrides applied on top of a profile's [`LlmModelConfig`].
///
/// Unset fields fall back to the profile configuration.
///
/// [`LlmModelConfig`]: crate::config::llm_model_config::LlmModelConfig
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerateOptions {
    /// Upper bound on generated tokens (`num_predict` for Ollama, `max_tokens` for OpenAI).
    pub max_tokens: Option<u32>,
    /// Sampling temperature; `0.0` asks the backend for deterministic output.
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }
}
