//! Default LLM configs loaded strictly from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], grouped by provider and role:
//!
//! - **Fast**      → chat model used for query rewriting and explanations
//! - **Embedding** → embedding generator used by the verse index
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = provider kind (`ollama` | `openai`), defaults to `ollama`
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL_FAST`           = chat model (falls back to `OLLAMA_MODEL`)
//! - `EMBEDDING_MODEL`             = embedding model (mandatory)
//!
//! OpenAI:
//! - `OPENAI_API_KEY`              = API key (mandatory)
//! - `OPENAI_URL`                  = endpoint, defaults to `https://api.openai.com`
//! - `OPENAI_MODEL`                = chat model, defaults to `gpt-4o-mini`
//! - `OPENAI_EMBEDDING_MODEL`      = defaults to `text-embedding-ada-002`

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_u32, must_env, validate_http_endpoint,
    },
};

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const OPENAI_DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// The profiles consumed by [`LlmServiceProfiles::new`].
///
/// [`LlmServiceProfiles::new`]: crate::service_profiles::LlmServiceProfiles::new
#[derive(Debug, Clone)]
pub struct ProfileConfigs {
    pub fast: LlmModelConfig,
    pub embedding: LlmModelConfig,
}

/// Reads `LLM_KIND` and builds all profiles for that provider.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - any error from the provider-specific constructors
pub fn profiles_from_env() -> Result<ProfileConfigs, AiLlmError> {
    let provider = match env_opt("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::Ollama,
    };

    match provider {
        LlmProvider::Ollama => Ok(ProfileConfigs {
            fast: config_ollama_fast()?,
            embedding: config_ollama_embedding()?,
        }),
        LlmProvider::OpenAI => Ok(ProfileConfigs {
            fast: config_openai_fast()?,
            embedding: config_openai_embedding()?,
        }),
    }
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Fast Ollama model (`OLLAMA_MODEL_FAST`, falls back to `OLLAMA_MODEL`).
pub fn config_ollama_fast() -> Result<LlmModelConfig, AiLlmError> {
    let model = env_opt("OLLAMA_MODEL_FAST")
        .or_else(|| env_opt("OLLAMA_MODEL"))
        .ok_or(ConfigError::MissingVar("OLLAMA_MODEL_FAST or OLLAMA_MODEL"))?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(120),
    })
}

/// Ollama embedding model (`EMBEDDING_MODEL`).
pub fn config_ollama_embedding() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("EMBEDDING_MODEL")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}

fn openai_base() -> Result<(String, String), AiLlmError> {
    let endpoint = env_opt("OPENAI_URL").unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());
    validate_http_endpoint("OPENAI_URL", &endpoint)?;
    let key = must_env("OPENAI_API_KEY")?;
    Ok((endpoint, key))
}

/// Fast OpenAI chat model (`OPENAI_MODEL`, default `gpt-4o-mini`).
pub fn config_openai_fast() -> Result<LlmModelConfig, AiLlmError> {
    let (endpoint, key) = openai_base()?;
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: env_opt("OPENAI_MODEL").unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
        endpoint,
        api_key: Some(key),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(60),
    })
}

/// OpenAI embedding model (`OPENAI_EMBEDDING_MODEL`).
pub fn config_openai_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let (endpoint, key) = openai_base()?;
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: env_opt("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|| OPENAI_DEFAULT_EMBEDDING_MODEL.to_string()),
        endpoint,
        api_key: Some(key),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(30),
    })
}
