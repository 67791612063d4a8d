//! Runtime configuration loaded from environment variables.

use thiserror::Error;

/// A `GITA_*` variable is set but cannot be used.
#[derive(Debug, Error, PartialEq)]
#[error("{key} has invalid value `{value}`: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: &'static str,
}

/// Pipeline knobs. Defaults reproduce the reference behaviour:
/// 5 query variations, 3 hits per variation, 2 verses, 200-token explanations
/// at temperature 0.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// F: paraphrases requested from the generator.
    pub query_variations: usize,
    /// k: hits requested from the index per variation.
    pub search_k: u64,
    /// topN: maximum verses returned per question.
    pub top_n: usize,
    pub explain_max_tokens: u32,
    /// Hard character bound applied to each explanation.
    pub explain_max_chars: usize,
    pub explain_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            query_variations: 5,
            search_k: 3,
            top_n: 2,
            explain_max_tokens: 200,
            explain_max_chars: 1200,
            explain_temperature: 0.0,
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables; unset or blank values keep the default.
    ///
    /// `GITA_QUERY_VARIATIONS`, `GITA_SEARCH_K`, `GITA_TOP_N`,
    /// `GITA_EXPLAIN_MAX_TOKENS`, `GITA_EXPLAIN_MAX_CHARS`, `GITA_EXPLAIN_TEMPERATURE`.
    ///
    /// # Errors
    /// A variable that is set but unparsable, zero, or (for the temperature)
    /// outside `0.0..=2.0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = Self::default();
        let count = |key: &str, dflt: usize| read(&get, key, dflt, |n| *n >= 1, "must be >= 1");

        Ok(Self {
            query_variations: count("GITA_QUERY_VARIATIONS", d.query_variations)?,
            search_k: read(&get, "GITA_SEARCH_K", d.search_k, |n| *n >= 1, "must be >= 1")?,
            top_n: count("GITA_TOP_N", d.top_n)?,
            explain_max_tokens: read(
                &get,
                "GITA_EXPLAIN_MAX_TOKENS",
                d.explain_max_tokens,
                |n| *n >= 1,
                "must be >= 1",
            )?,
            explain_max_chars: count("GITA_EXPLAIN_MAX_CHARS", d.explain_max_chars)?,
            explain_temperature: read(
                &get,
                "GITA_EXPLAIN_TEMPERATURE",
                d.explain_temperature,
                |t| (0.0..=2.0).contains(t),
                "must be within 0.0..=2.0",
            )?,
        })
    }
}

fn read<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    dflt: T,
    valid: impl Fn(&T) -> bool,
    reason: &'static str,
) -> Result<T, ConfigError> {
    let Some(raw) = get(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(dflt);
    };
    let err = |reason| ConfigError {
        key: key.to_string(),
        value: raw.clone(),
        reason,
    };
    let v: T = raw.trim().parse().map_err(|_| err("not a number"))?;
    if valid(&v) { Ok(v) } else { Err(err(reason)) }
}
