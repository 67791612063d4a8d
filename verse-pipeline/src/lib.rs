//! Question → verses pipeline.
//!
//! [`GitaPipeline::ask`] expands the question into paraphrases, searches the
//! verse index with each, keeps the verses the paraphrases agree on most
//! ([`consensus`]), and asks the generator for a grounded explanation of each.

mod backend;
pub mod cfg;
pub mod consensus;
mod error;
pub mod expand;
pub mod explain;
pub mod prompt;
mod types;

#[cfg(test)]
mod test_support;

pub use backend::{BoxFuture, PassageIndex, TextGenerator};
pub use cfg::{ConfigError, PipelineConfig};
pub use error::{BackendError, FailureKind, PipelineError};
pub use types::{ConsensusGroup, ConsensusSelection, PassageKey, SelectedVerse};

use std::{sync::Arc, time::Instant};

use ai_llm_service::GenerateOptions;
use tracing::{info, instrument};

/// Stateless orchestrator over shared, long-lived collaborators.
///
/// Build once at startup and share behind `Arc`; each call to [`ask`](Self::ask)
/// owns all of its intermediate state.
pub struct GitaPipeline {
    generator: Arc<dyn TextGenerator>,
    index: Arc<dyn PassageIndex>,
    cfg: PipelineConfig,
}

impl GitaPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        index: Arc<dyn PassageIndex>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            index,
            cfg,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Paraphrases of `question` (temperature 0).
    pub async fn expand(&self, question: &str) -> Result<Vec<String>, PipelineError> {
        expand::expand_question(
            self.generator.as_ref(),
            question,
            self.cfg.query_variations,
            GenerateOptions::default().temperature(0.0),
        )
        .await
    }

    /// Consensus selection of at most `top_n` verses.
    pub async fn retrieve(&self, question: &str) -> Result<ConsensusSelection, PipelineError> {
        consensus::retrieve(
            self.generator.as_ref(),
            self.index.as_ref(),
            question,
            &self.cfg,
        )
        .await
    }

    /// One explanation per selected entry, in selection order.
    pub async fn explain(
        &self,
        selection: &ConsensusSelection,
    ) -> Result<Vec<SelectedVerse>, PipelineError> {
        explain::explain_selected(self.generator.as_ref(), selection, &self.cfg).await
    }

    /// Full pipeline. An empty result means no relevant verse was found.
    #[instrument(skip_all)]
    pub async fn ask(&self, question: &str) -> Result<Vec<SelectedVerse>, PipelineError> {
        let started = Instant::now();
        let selection = self.retrieve(question).await?;
        let verses = self.explain(&selection).await?;

        info!(
            verses = verses.len(),
            latency_ms = started.elapsed().as_millis(),
            "question answered"
        );
        Ok(verses)
    }
}
