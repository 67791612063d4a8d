//! Health probes for LLM backends.
//!
//! - Ollama: `GET {endpoint}/api/tags`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth
//!
//! Both probes check (best-effort) that the configured model is listed.
//! [`HealthService::check`] never fails; errors are mapped to `ok = false`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker reusing a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

// Ollama: { "models": [ { "name": "<model>" } ] }
#[derive(Deserialize)]
struct OllamaTags {
    models: Option<Vec<OllamaTag>>,
}
#[derive(Deserialize)]
struct OllamaTag {
    name: String,
}

// OpenAI: { "data": [ { "id": "<model>" } ] }
#[derive(Deserialize)]
struct OpenAiModels {
    data: Vec<OpenAiModel>,
}
#[derive(Deserialize)]
struct OpenAiModel {
    id: String,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds, default 10).
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks a single config. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            warn!(provider = ?cfg.provider, endpoint = %cfg.endpoint, "invalid endpoint");
            return HealthStatus::new(cfg, false, 0, "endpoint is empty or missing http/https");
        }

        let start = Instant::now();
        let status = match self.probe(cfg).await {
            Ok(status) => status,
            Err(err) => HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string()),
        };

        if status.ok {
            info!(
                provider = %status.provider,
                model = %cfg.model,
                latency_ms = status.latency_ms,
                "health probe completed"
            );
        } else {
            warn!(
                provider = %status.provider,
                model = %cfg.model,
                latency_ms = status.latency_ms,
                message = %status.message,
                "health probe failed"
            );
        }
        status
    }

    /// Checks multiple configs sequentially.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let base = cfg.endpoint.trim().trim_end_matches('/');
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let req = match cfg.provider {
            LlmProvider::Ollama => self.client.get(format!("{base}/api/tags")),
            LlmProvider::OpenAI => {
                let key = cfg.api_key.as_deref().ok_or_else(|| {
                    HealthError::Decode("missing OpenAI API key".into())
                })?;
                self.client
                    .get(format!("{base}/v1/models"))
                    .header(header::AUTHORIZATION, format!("Bearer {key}"))
            }
        };

        let start = Instant::now();
        let resp = req.timeout(timeout).send().await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let url = resp.url().to_string();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        let listed = match cfg.provider {
            LlmProvider::Ollama => resp
                .json::<OllamaTags>()
                .await
                .map(|t| t.models.map(|m| m.iter().any(|x| x.name == cfg.model))),
            LlmProvider::OpenAI => resp
                .json::<OpenAiModels>()
                .await
                .map(|m| Some(m.data.iter().any(|x| x.id == cfg.model))),
        };

        Ok(match listed {
            Ok(Some(true)) | Ok(None) => {
                HealthStatus::new(cfg, true, latency, "backend is healthy")
            }
            Ok(Some(false)) => HealthStatus::new(
                cfg,
                false,
                latency,
                "backend is up, but model is not listed",
            ),
            Err(e) => HealthStatus::new(
                cfg,
                true,
                latency,
                format!("backend is reachable; failed to decode model list: {e}"),
            ),
        })
    }
}
