//! Consensus retrieval: search with every query variation, then keep the
//! verses the variations agree on most.
//!
//! Ordering rules (all "first seen" refers to the flattened hit list, which is
//! query-major: every hit of variation 1, then variation 2, ...):
//!
//! - Tally keys `(verse_id, variant_index)` are ordered by first appearance.
//! - A verse's group is created when its first key is met in tally order, so
//!   groups are ordered by the verse's first appearance.
//! - Within a verse, a later variant replaces the current one only with a
//!   strictly higher count. Equal counts keep the earlier variant.
//! - Groups are sorted by count, descending, with a stable sort. Equal counts
//!   keep group order.
//! - The representative hit of a selected key is the **last** hit with that key.
//!   Output keys are ordered by their first matching hit.

use std::collections::HashMap;

use ai_llm_service::GenerateOptions;
use tracing::{debug, info, instrument};
use verse_store::PassageHit;

use crate::{
    backend::{PassageIndex, TextGenerator},
    cfg::PipelineConfig,
    error::PipelineError,
    expand::expand_question,
    types::{ConsensusGroup, ConsensusSelection, PassageKey},
};

/// Expands `question`, searches with every variation, and selects by consensus.
///
/// Zero hits across all searches is a valid outcome and returns an empty selection.
#[instrument(skip_all, fields(top_n = cfg.top_n, k = cfg.search_k))]
pub async fn retrieve(
    generator: &dyn TextGenerator,
    index: &dyn PassageIndex,
    question: &str,
    cfg: &PipelineConfig,
) -> Result<ConsensusSelection, PipelineError> {
    let queries = expand_question(
        generator,
        question,
        cfg.query_variations,
        GenerateOptions::default().temperature(0.0),
    )
    .await?;

    let hits = gather_hits(index, &queries, cfg.search_k).await?;
    let selection = select(&hits, cfg.top_n);

    info!(
        queries = queries.len(),
        hits = hits.len(),
        selected = selection.len(),
        "consensus retrieval finished"
    );
    Ok(selection)
}

/// Runs one search per query, sequentially, and flattens the hits query-major.
pub async fn gather_hits(
    index: &dyn PassageIndex,
    queries: &[String],
    k: u64,
) -> Result<Vec<PassageHit>, PipelineError> {
    let mut all = Vec::new();
    for (i, q) in queries.iter().enumerate() {
        let hits = index
            .search(q, k)
            .await
            .map_err(PipelineError::IndexUnavailable)?;
        debug!(query_no = i + 1, hits = hits.len(), "variation searched");
        all.extend(hits);
    }
    Ok(all)
}

/// Counts hits per `(verse_id, variant_index)`, in first-seen key order.
pub fn tally(hits: &[PassageHit]) -> Vec<(PassageKey, usize)> {
    let mut slots: HashMap<PassageKey, usize> = HashMap::new();
    let mut out: Vec<(PassageKey, usize)> = Vec::new();

    for hit in hits {
        let key = PassageKey::of(hit);
        match slots.get(&key) {
            Some(&i) => out[i].1 += 1,
            None => {
                slots.insert(key.clone(), out.len());
                out.push((key, 1));
            }
        }
    }
    out
}

/// One group per verse holding its most frequent variant.
pub fn consensus_groups(tally: &[(PassageKey, usize)]) -> Vec<ConsensusGroup> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<ConsensusGroup> = Vec::new();

    for (key, count) in tally {
        match slots.get(key.verse_id.as_str()) {
            Some(&i) => {
                let g = &mut groups[i];
                if *count > g.count {
                    g.variant_index = key.variant_index;
                    g.count = *count;
                }
            }
            None => {
                slots.insert(key.verse_id.as_str(), groups.len());
                groups.push(ConsensusGroup {
                    verse_id: key.verse_id.clone(),
                    variant_index: key.variant_index,
                    count: *count,
                });
            }
        }
    }
    groups
}

/// Top `top_n` groups by count; stable on ties.
pub fn rank_groups(mut groups: Vec<ConsensusGroup>, top_n: usize) -> Vec<ConsensusGroup> {
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(top_n);
    groups
}

/// Full consensus selection over a flattened hit list.
pub fn select(hits: &[PassageHit], top_n: usize) -> ConsensusSelection {
    let winners = rank_groups(consensus_groups(&tally(hits)), top_n);
    for g in &winners {
        info!(
            verse_id = %g.verse_id,
            variant_index = g.variant_index,
            count = g.count,
            "consensus group selected"
        );
    }

    let keys: Vec<PassageKey> = winners.iter().map(ConsensusGroup::key).collect();
    hits.iter()
        .filter_map(|h| {
            let key = PassageKey::of(h);
            keys.contains(&key).then(|| (key, h.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MapIndex, ScriptedGenerator, hit, hit_with_text};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn keys(sel: &ConsensusSelection) -> Vec<(String, u32)> {
        sel.keys()
            .map(|k| (k.verse_id.clone(), k.variant_index))
            .collect()
    }

    #[test]
    fn tally_counts_each_variant_separately() {
        let hits = vec![hit("2.47", 1), hit("2.47", 2), hit("2.47", 1), hit("3.1", 1)];
        assert_eq!(
            tally(&hits),
            vec![
                (PassageKey::new("2.47", 1), 2),
                (PassageKey::new("2.47", 2), 1),
                (PassageKey::new("3.1", 1), 1),
            ]
        );
    }

    #[test]
    fn majority_variant_wins_its_verse() {
        let hits = vec![
            hit("2.47", 1),
            hit("2.47", 2),
            hit("2.47", 1),
            hit("2.47", 1),
        ];
        let groups = consensus_groups(&tally(&hits));
        assert_eq!(
            groups,
            vec![ConsensusGroup {
                verse_id: "2.47".into(),
                variant_index: 1,
                count: 3
            }]
        );
        assert_eq!(keys(&select(&hits, 2)), vec![("2.47".to_string(), 1)]);
    }

    #[test]
    fn variant_tie_keeps_first_seen_variant() {
        let hits = vec![hit("4.7", 3), hit("4.7", 1), hit("4.7", 1), hit("4.7", 3)];
        let groups = consensus_groups(&tally(&hits));
        assert_eq!(groups[0].variant_index, 3);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn later_variant_with_higher_count_replaces() {
        let hits = vec![hit("4.7", 3), hit("4.7", 1), hit("4.7", 1)];
        let groups = consensus_groups(&tally(&hits));
        assert_eq!(groups[0].variant_index, 1);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn four_single_hits_pick_first_two_verses() {
        let hits = vec![hit("1.1", 1), hit("2.2", 1), hit("3.3", 1), hit("4.4", 1)];
        let sel = select(&hits, 2);
        assert_eq!(sel.len(), 2);
        assert_eq!(
            keys(&sel),
            vec![("1.1".to_string(), 1), ("2.2".to_string(), 1)]
        );
    }

    #[test]
    fn higher_count_outranks_earlier_verse() {
        let hits = vec![hit("1.1", 1), hit("9.9", 2), hit("5.5", 1), hit("9.9", 2)];
        let sel = select(&hits, 1);
        assert_eq!(keys(&sel), vec![("9.9".to_string(), 2)]);
    }

    #[test]
    fn representative_is_last_matching_hit() {
        let hits = vec![
            hit_with_text("2.47", 1, "first"),
            hit_with_text("3.1", 1, "other"),
            hit_with_text("2.47", 1, "last"),
        ];
        let sel = select(&hits, 1);
        assert_eq!(sel.get(&PassageKey::new("2.47", 1)).unwrap().text, "last");
    }

    #[test]
    fn output_order_follows_first_matching_hit() {
        // 5.5 ranks first (count 2) but 1.1 is hit first.
        let hits = vec![hit("1.1", 1), hit("5.5", 1), hit("5.5", 1)];
        let sel = select(&hits, 2);
        assert_eq!(
            keys(&sel),
            vec![("1.1".to_string(), 1), ("5.5".to_string(), 1)]
        );
    }

    #[test]
    fn no_hits_select_nothing() {
        assert!(select(&[], 2).is_empty());
        assert!(tally(&[]).is_empty());
    }

    #[tokio::test]
    async fn retrieve_searches_every_variation_in_order() {
        let generator = ScriptedGenerator::new(vec![Ok("q1\nq2\nq3".into())]);
        let index = MapIndex::new()
            .with("q1", vec![hit("2.47", 1), hit("2.47", 2)])
            .with("q2", vec![hit("2.47", 1)])
            .with("q3", vec![hit("2.47", 1), hit("6.5", 1)]);

        let sel = retrieve(&generator, &index, "What is duty?", &PipelineConfig::default())
            .await
            .unwrap();

        assert_eq!(index.queries(), vec!["q1", "q2", "q3"]);
        assert_eq!(
            keys(&sel),
            vec![("2.47".to_string(), 1), ("6.5".to_string(), 1)]
        );
        let (_, opts) = generator.calls().remove(0);
        assert_eq!(opts.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn retrieve_with_no_hits_is_empty_not_error() {
        let generator = ScriptedGenerator::new(vec![Ok("a\nb\nc\nd\ne".into())]);
        let index = MapIndex::new();
        let sel = retrieve(&generator, &index, "?", &PipelineConfig::default())
            .await
            .unwrap();
        assert!(sel.is_empty());
        assert_eq!(index.queries().len(), 5);
    }

    #[tokio::test]
    async fn index_failure_aborts_retrieval() {
        let generator = ScriptedGenerator::new(vec![Ok("a\nb".into())]);
        let index = MapIndex::new().failing_on("b");
        let err = retrieve(&generator, &index, "?", &PipelineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::IndexUnavailable(_)));
    }

    fn arb_hits() -> impl Strategy<Value = Vec<PassageHit>> {
        prop::collection::vec((0u8..6, 1u32..4), 0..40).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (v, idx))| hit_with_text(&format!("{v}.{v}"), idx, &format!("hit#{i}")))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn selection_is_bounded_and_verses_distinct(hits in arb_hits(), top_n in 1usize..4) {
            let sel = select(&hits, top_n);
            prop_assert!(sel.len() <= top_n);

            let mut verses: Vec<&str> = sel.keys().map(|k| k.verse_id.as_str()).collect();
            let before = verses.len();
            verses.sort_unstable();
            verses.dedup();
            prop_assert_eq!(before, verses.len());

            let distinct_in_input = consensus_groups(&tally(&hits)).len();
            prop_assert_eq!(sel.len(), distinct_in_input.min(top_n));
        }

        #[test]
        fn selected_variant_is_the_mode_of_its_verse(hits in arb_hits()) {
            let counts = tally(&hits);
            let sel = select(&hits, 3);
            for key in sel.keys() {
                let chosen = counts.iter().find(|(k, _)| k == key).map(|(_, c)| *c).unwrap_or(0);
                for (k, c) in &counts {
                    if k.verse_id == key.verse_id {
                        prop_assert!(chosen >= *c);
                    }
                }
            }
        }

        #[test]
        fn selected_verses_outrank_unselected(hits in arb_hits(), top_n in 1usize..4) {
            let groups = consensus_groups(&tally(&hits));
            let sel = select(&hits, top_n);
            let min_selected = groups
                .iter()
                .filter(|g| sel.get(&g.key()).is_some())
                .map(|g| g.count)
                .min();
            if let Some(min_selected) = min_selected {
                for g in groups.iter().filter(|g| sel.get(&g.key()).is_none()) {
                    prop_assert!(g.count <= min_selected);
                }
            }
        }

        #[test]
        fn unseen_verses_never_selected(hits in arb_hits()) {
            let sel = select(&hits, 3);
            for (key, rep) in sel.iter() {
                prop_assert!(hits.iter().any(|h| h.metadata.verse_id == key.verse_id));
                prop_assert_eq!(&PassageKey::of(rep), key);
                let last = hits.iter().rev().find(|h| &PassageKey::of(h) == key);
                prop_assert_eq!(Some(rep), last);
            }
        }

        #[test]
        fn selection_is_idempotent(hits in arb_hits()) {
            prop_assert_eq!(select(&hits, 2), select(&hits, 2));
        }
    }
}
