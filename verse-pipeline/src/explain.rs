//! Grounded, length-bounded explanation per selected verse.

use std::time::Instant;

use ai_llm_service::GenerateOptions;
use tracing::{debug, instrument};

use crate::{
    backend::TextGenerator,
    cfg::PipelineConfig,
    error::PipelineError,
    prompt::explanation_prompt,
    types::{ConsensusSelection, SelectedVerse},
};

/// Explains every entry of `selection`, in selection order, one call at a time.
///
/// All-or-nothing: the first failed or blank explanation aborts the batch.
#[instrument(skip_all, fields(verses = selection.len()))]
pub async fn explain_selected(
    generator: &dyn TextGenerator,
    selection: &ConsensusSelection,
    cfg: &PipelineConfig,
) -> Result<Vec<SelectedVerse>, PipelineError> {
    let opts = GenerateOptions::default()
        .max_tokens(cfg.explain_max_tokens)
        .temperature(cfg.explain_temperature);

    let mut out = Vec::with_capacity(selection.len());
    for (key, hit) in selection.iter() {
        let started = Instant::now();
        let prompt = explanation_prompt(
            &key.verse_id,
            &hit.text,
            &hit.metadata.sanskrit_text,
            cfg.explain_max_tokens,
        );

        let raw = generator
            .complete(&prompt, opts)
            .await
            .map_err(|source| PipelineError::Explanation {
                verse_id: key.verse_id.clone(),
                source,
            })?;

        let explanation = clamp_chars(raw.trim(), cfg.explain_max_chars);
        if explanation.is_empty() {
            return Err(PipelineError::EmptyExplanation {
                verse_id: key.verse_id.clone(),
            });
        }

        debug!(
            verse_id = %key.verse_id,
            chars = explanation.chars().count(),
            latency_ms = started.elapsed().as_millis(),
            "verse explained"
        );

        out.push(SelectedVerse {
            verse_id: key.verse_id.clone(),
            sanskrit_text: hit.metadata.sanskrit_text.clone(),
            translation: hit.text.clone(),
            explanation,
        });
    }
    Ok(out)
}

/// Cuts `s` to at most `max_chars` characters, ending with `…` when cut.
pub fn clamp_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}
