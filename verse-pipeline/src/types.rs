//! Per-request value types.

use serde::{Deserialize, Serialize};
use verse_store::PassageHit;

/// Identity of one indexed passage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassageKey {
    pub verse_id: String,
    pub variant_index: u32,
}

impl PassageKey {
    pub fn new(verse_id: impl Into<String>, variant_index: u32) -> Self {
        Self {
            verse_id: verse_id.into(),
            variant_index,
        }
    }

    pub fn of(hit: &PassageHit) -> Self {
        Self::new(hit.metadata.verse_id.clone(), hit.metadata.variant_index)
    }
}

/// Best-agreeing variant of one verse and its hit count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusGroup {
    pub verse_id: String,
    pub variant_index: u32,
    pub count: usize,
}

impl ConsensusGroup {
    pub fn key(&self) -> PassageKey {
        PassageKey::new(self.verse_id.clone(), self.variant_index)
    }
}

/// Ordered mapping `(verse_id, variant_index) -> representative hit`.
///
/// Keys keep the order in which they were first inserted; inserting an
/// existing key replaces its hit in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsensusSelection {
    entries: Vec<(PassageKey, PassageHit)>,
}

impl ConsensusSelection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &PassageKey) -> Option<&PassageHit> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, h)| h)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PassageKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PassageKey, &PassageHit)> {
        self.entries.iter().map(|(k, h)| (k, h))
    }

    pub(crate) fn upsert(&mut self, key: PassageKey, hit: PassageHit) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = hit,
            None => self.entries.push((key, hit)),
        }
    }
}

impl FromIterator<(PassageKey, PassageHit)> for ConsensusSelection {
    fn from_iter<I: IntoIterator<Item = (PassageKey, PassageHit)>>(iter: I) -> Self {
        let mut sel = Self::default();
        for (k, h) in iter {
            sel.upsert(k, h);
        }
        sel
    }
}

/// One explained verse, as returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedVerse {
    pub verse_id: String,
    pub sanskrit_text: String,
    /// The translation variant that won consensus.
    pub translation: String,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::hit_with_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn selected_verse_wire_shape() {
        let v = SelectedVerse {
            verse_id: "2.47".into(),
            sanskrit_text: "कर्मण्येवाधिकारस्ते".into(),
            translation: "You have a right to work".into(),
            explanation: "Act without attachment.".into(),
        };
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            serde_json::json!({
                "verse_id": "2.47",
                "sanskrit_text": "कर्मण्येवाधिकारस्ते",
                "translation": "You have a right to work",
                "explanation": "Act without attachment."
            })
        );
    }

    #[test]
    fn selection_replaces_in_place_and_keeps_first_order() {
        let sel: ConsensusSelection = [
            (PassageKey::new("1.1", 1), hit_with_text("1.1", 1, "a")),
            (PassageKey::new("2.2", 1), hit_with_text("2.2", 1, "b")),
            (PassageKey::new("1.1", 1), hit_with_text("1.1", 1, "c")),
        ]
        .into_iter()
        .collect();

        let texts: Vec<&str> = sel.iter().map(|(_, h)| h.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "b"]);
        assert_eq!(sel.len(), 2);
    }
}
