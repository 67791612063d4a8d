//! Embedding executor with bounded concurrency and dimension checks.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::{embed::EmbeddingsProvider, errors::VerseStoreError, record::Passage};

/// Embeds every passage, returning vectors in input order.
///
/// All vectors must share one dimension (the first one's, or `expected_dim`).
pub async fn embed_passages(
    passages: &[Passage],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, VerseStoreError> {
    debug!(
        total = passages.len(),
        concurrency, "embed_pool::embed_passages"
    );

    let vectors: Vec<Vec<f32>> = stream::iter(passages.iter())
        .map(|p| provider.embed(&p.text))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let want = expected_dim.or_else(|| vectors.first().map(Vec::len));
    if let Some(want) = want {
        if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
            return Err(VerseStoreError::VectorSizeMismatch {
                got: bad.len(),
                want,
            });
        }
    }

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Speaker, VerseRecord};
    use std::{future::Future, pin::Pin};

    /// Vector = [len(text), first byte]; lets tests check ordering.
    struct LenEmbedder;

    impl EmbeddingsProvider for LenEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VerseStoreError>> + Send + 'a>> {
            Box::pin(async move {
                Ok(vec![
                    text.len() as f32,
                    text.bytes().next().unwrap_or(0) as f32,
                ])
            })
        }
    }

    fn passages() -> Vec<Passage> {
        VerseRecord {
            verse_id: "2.47".into(),
            speaker: Speaker::Krishna,
            sanskrit_text: String::new(),
            variants: vec!["a".into(), "bbb".into(), "cc".into()],
        }
        .passages()
        .collect()
    }

    #[tokio::test]
    async fn keeps_input_order() {
        let out = embed_passages(&passages(), &LenEmbedder, None, 3).await.unwrap();
        assert_eq!(
            out,
            vec![vec![1.0, 97.0], vec![3.0, 98.0], vec![2.0, 99.0]]
        );
    }

    #[tokio::test]
    async fn enforces_expected_dim() {
        let err = embed_passages(&passages(), &LenEmbedder, Some(4), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerseStoreError::VectorSizeMismatch { got: 2, want: 4 }
        ));
    }
}
