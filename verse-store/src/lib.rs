//! Verse corpus loader and passage index over Qdrant.
//!
//! - Loads the structured verse table from JSONL ([`corpus`])
//! - Builds the index once per process: one point per non-empty translation variant
//! - Serves `search(query, k)` returning passages tagged with `(verse_id, variant_index)`

pub mod config;
pub mod corpus;
mod embed;
mod embed_pool;
mod errors;
mod ingest;
mod qdrant_facade;
mod record;

pub use config::{DistanceKind, VerseStoreConfig};
pub use embed::{EmbeddingsProvider, llm::LlmEmbedder};
pub use errors::VerseStoreError;
pub use record::{Passage, PassageHit, PassageMetadata, Speaker, VerseRecord, point_id};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, trace};

/// Outcome of the one-time index initialization.
#[derive(Clone, Debug, Serialize)]
pub struct IndexStats {
    pub collection: String,
    pub points: u64,
    /// `true` when an existing non-empty collection was reused as-is.
    pub reused: bool,
}

/// Long-lived, shared verse index.
///
/// Construct once at startup, call [`VerseStore::ensure_index`] before serving,
/// then share behind `Arc`. `search` is read-only.
pub struct VerseStore {
    cfg: VerseStoreConfig,
    qdrant: qdrant_facade::QdrantFacade,
    embedder: Arc<dyn EmbeddingsProvider>,
    ready: OnceCell<IndexStats>,
}

impl VerseStore {
    pub fn new(
        cfg: VerseStoreConfig,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, VerseStoreError> {
        trace!(collection = %cfg.collection, "VerseStore::new");
        let qdrant = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self {
            cfg,
            qdrant,
            embedder,
            ready: OnceCell::new(),
        })
    }

    /// Builds the index if needed. Concurrent callers wait for the single
    /// in-flight initialization; later calls return the cached stats.
    ///
    /// An existing non-empty collection is reused unless `reindex` is set.
    pub async fn ensure_index(&self) -> Result<&IndexStats, VerseStoreError> {
        self.ready.get_or_try_init(|| self.build_or_reuse()).await
    }

    /// Stats of the completed initialization, if any.
    pub fn index_stats(&self) -> Option<&IndexStats> {
        self.ready.get()
    }

    /// Top-`k` passages for `query`, ordered by score.
    ///
    /// # Errors
    /// [`VerseStoreError::NotReady`] before [`ensure_index`](Self::ensure_index)
    /// succeeded; embedding or Qdrant failures otherwise.
    pub async fn search(&self, query: &str, k: u64) -> Result<Vec<PassageHit>, VerseStoreError> {
        if !self.ready.initialized() {
            return Err(VerseStoreError::NotReady);
        }

        let vector = self.embedder.embed(query).await?;
        let raw = self.qdrant.search(vector, k).await?;
        let hits: Vec<PassageHit> = raw
            .iter()
            .filter_map(|(score, payload)| ingest::hit_from_payload(*score, payload))
            .collect();

        debug!(k, returned = raw.len(), kept = hits.len(), "verse search");
        Ok(hits)
    }

    async fn build_or_reuse(&self) -> Result<IndexStats, VerseStoreError> {
        let collection = self.qdrant.collection().to_string();

        if !self.cfg.reindex {
            if let Some(points) = self.qdrant.point_count().await?.filter(|n| *n > 0) {
                info!(%collection, points, "reusing existing verse index");
                return Ok(IndexStats {
                    collection,
                    points,
                    reused: true,
                });
            }
        }

        let verses = corpus::load_corpus(&self.cfg.corpus_path)?;
        let points =
            ingest::build_index(&self.cfg, &self.qdrant, self.embedder.as_ref(), &verses).await?;
        Ok(IndexStats {
            collection,
            points,
            reused: false,
        })
    }
}
