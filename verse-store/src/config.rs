//! Runtime configuration for the verse index, read from environment variables.

use std::path::PathBuf;

use crate::errors::VerseStoreError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    Cosine,
    Dot,
    Euclid,
}

impl DistanceKind {
    /// Parse from env string (case-insensitive). Defaults to Cosine.
    pub fn from_env(s: Option<String>) -> Self {
        match s.unwrap_or_default().trim().to_lowercase().as_str() {
            "dot" | "dotproduct" => DistanceKind::Dot,
            "euclid" | "l2" => DistanceKind::Euclid,
            _ => DistanceKind::Cosine,
        }
    }
}

#[derive(Clone, Debug)]
pub struct VerseStoreConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub distance: DistanceKind,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Expected embedding dimension; learned from the first vector when `None`.
    pub embedding_dim: Option<usize>,
    /// Max concurrent embedding calls while building the index.
    pub embed_concurrency: usize,
    /// JSONL corpus used for the one-time build. The default points at a small
    /// bundled sample; set `GITA_CORPUS_PATH` to the full verse table.
    pub corpus_path: PathBuf,
    /// Drop and rebuild the collection even if it already holds points.
    pub reindex: bool,
}

impl VerseStoreConfig {
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            embedding_dim: None,
            embed_concurrency: 4,
            corpus_path: PathBuf::from("data/structured_gita.jsonl"),
            reindex: false,
        }
    }

    /// Build configuration from environment variables.
    ///
    /// - `QDRANT_URL` (default: `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default: `gita_verses`)
    /// - `QDRANT_DISTANCE` (`Cosine` | `Dot` | `Euclid`; default `Cosine`)
    /// - `QDRANT_BATCH_SIZE` (default: 256)
    /// - `EMBEDDING_DIM` (optional)
    /// - `EMBEDDING_CONCURRENCY` (default: 4)
    /// - `GITA_CORPUS_PATH` (default: `data/structured_gita.jsonl`)
    /// - `GITA_REINDEX` (default: false)
    pub fn from_env() -> Result<Self, VerseStoreError> {
        let cfg = Self {
            qdrant_url: env_string("QDRANT_URL")
                .unwrap_or_else(|| "http://localhost:6334".into()),
            qdrant_api_key: env_string("QDRANT_API_KEY"),
            collection: env_string("QDRANT_COLLECTION").unwrap_or_else(|| "gita_verses".into()),
            distance: DistanceKind::from_env(env_string("QDRANT_DISTANCE")),
            upsert_batch: read_env("QDRANT_BATCH_SIZE")?.unwrap_or(256),
            embedding_dim: read_env("EMBEDDING_DIM")?,
            embed_concurrency: read_env("EMBEDDING_CONCURRENCY")?.unwrap_or(4),
            corpus_path: env_string("GITA_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/structured_gita.jsonl")),
            reindex: read_env("GITA_REINDEX")?.unwrap_or(false),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), VerseStoreError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(VerseStoreError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(VerseStoreError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(VerseStoreError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(VerseStoreError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Reads and parses an optional env var; set-but-invalid is an error.
fn read_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, VerseStoreError> {
    match env_string(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| VerseStoreError::Config(format!("{key} has invalid value `{v}`"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_parsing_defaults_to_cosine() {
        assert_eq!(DistanceKind::from_env(None), DistanceKind::Cosine);
        assert_eq!(DistanceKind::from_env(Some("L2".into())), DistanceKind::Euclid);
        assert_eq!(DistanceKind::from_env(Some("dot".into())), DistanceKind::Dot);
        assert_eq!(DistanceKind::from_env(Some("???".into())), DistanceKind::Cosine);
    }

    #[test]
    fn validate_rejects_zero_batch_and_dim() {
        let mut cfg = VerseStoreConfig::new_default("http://localhost:6334", "gita");
        assert!(cfg.validate().is_ok());
        cfg.upsert_batch = 0;
        assert!(cfg.validate().is_err());
        cfg.upsert_batch = 8;
        cfg.embedding_dim = Some(0);
        assert!(cfg.validate().is_err());
    }
}
