//! One-time index build: verses → passages → embeddings → Qdrant points.

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    config::VerseStoreConfig,
    embed::EmbeddingsProvider,
    embed_pool::embed_passages,
    errors::VerseStoreError,
    qdrant_facade::QdrantFacade,
    record::{Passage, PassageHit, PassageMetadata, Speaker, VerseRecord},
};

/// Embeds every non-empty variant of every verse and (re)creates the collection.
///
/// The vector size of the collection is taken from the first embedded batch.
/// Returns the number of points written.
pub(crate) async fn build_index(
    cfg: &VerseStoreConfig,
    qdrant: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    verses: &[VerseRecord],
) -> Result<u64, VerseStoreError> {
    let passages: Vec<Passage> = verses.iter().flat_map(VerseRecord::passages).collect();
    if passages.is_empty() {
        return Err(VerseStoreError::EmptyCorpus);
    }

    info!(
        collection = qdrant.collection(),
        verses = verses.len(),
        passages = passages.len(),
        "building verse index"
    );

    let pb = ProgressBar::new(passages.len() as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} indexing [{bar:40}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut dim = cfg.embedding_dim;
    let mut created = false;
    let mut written = 0u64;

    for chunk in passages.chunks(cfg.upsert_batch) {
        let vectors = embed_passages(chunk, provider, dim, cfg.embed_concurrency).await?;

        if !created {
            let size = vectors.first().map(Vec::len).unwrap_or(0);
            if size == 0 {
                return Err(VerseStoreError::Config(
                    "embedding backend returned empty vectors".into(),
                ));
            }
            qdrant.recreate_collection(size).await?;
            dim = Some(size);
            created = true;
        }

        let batch = chunk
            .iter()
            .zip(vectors)
            .map(|(p, v)| (p.point_id(), v, passage_payload(p)))
            .collect::<Vec<_>>();

        written += qdrant.upsert(batch).await? as u64;
        pb.inc(chunk.len() as u64);
        debug!(written, "batch upserted");
    }

    pb.finish_and_clear();
    info!(collection = qdrant.collection(), points = written, "verse index built");
    Ok(written)
}

/// Flat payload stored next to each vector.
pub(crate) fn passage_payload(p: &Passage) -> Value {
    json!({
        "verse_id": p.metadata.verse_id,
        "variant_index": p.metadata.variant_index,
        "speaker": p.metadata.speaker.to_string(),
        "sanskrit_text": p.metadata.sanskrit_text,
        "text": p.text,
    })
}

/// Rebuilds a hit from a search payload; `None` if identity fields are missing.
pub(crate) fn hit_from_payload(score: f32, payload: &Value) -> Option<PassageHit> {
    let verse_id = payload.get("verse_id")?.as_str()?.to_string();
    let variant_index = payload
        .get("variant_index")?
        .as_u64()
        .filter(|i| *i >= 1)
        .and_then(|i| u32::try_from(i).ok());

    let Some(variant_index) = variant_index else {
        warn!(%verse_id, "search hit without a valid variant_index; skipped");
        return None;
    };

    let str_field = |k: &str| {
        payload
            .get(k)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(PassageHit {
        text: str_field("text"),
        metadata: PassageMetadata {
            verse_id,
            variant_index,
            speaker: Speaker::from_label(&str_field("speaker")),
            sanskrit_text: str_field("sanskrit_text"),
        },
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn passage() -> Passage {
        VerseRecord {
            verse_id: "2.47".into(),
            speaker: Speaker::Krishna,
            sanskrit_text: "कर्मण्येवाधिकारस्ते".into(),
            variants: vec!["".into(), "You have a right to perform your prescribed duties".into()],
        }
        .passages()
        .next()
        .unwrap()
    }

    #[test]
    fn payload_round_trips_into_hit() {
        let p = passage();
        let payload = passage_payload(&p);
        assert_eq!(payload["variant_index"], 2);

        let hit = hit_from_payload(0.87, &payload).unwrap();
        assert_eq!(hit.metadata, p.metadata);
        assert_eq!(hit.text, p.text);
        assert_eq!(hit.score, 0.87);
    }

    #[test]
    fn hits_without_identity_are_dropped() {
        assert!(hit_from_payload(0.5, &json!({ "text": "x" })).is_none());
        assert!(hit_from_payload(0.5, &json!({ "verse_id": "1.1" })).is_none());
        assert!(hit_from_payload(0.5, &json!({ "verse_id": "1.1", "variant_index": 0 })).is_none());
    }
}
