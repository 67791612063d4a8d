//! Core data models: verses, passages, and search hits.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who speaks a verse.
///
/// The source dataset labels speakers in Devanagari; those labels are mapped
/// onto the English names. Anything unrecognised is kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Speaker {
    Krishna,
    Arjun,
    Sanjay,
    Dhritrashtra,
    Other(String),
}

impl Speaker {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.contains("भगवान") {
            return Speaker::Krishna;
        }
        match label {
            "अर्जुन" => Speaker::Arjun,
            "सञ्जय" | "संजय" => Speaker::Sanjay,
            "धृतराष्ट्र" => Speaker::Dhritrashtra,
            _ => match label.to_ascii_lowercase().as_str() {
                "krishna" => Speaker::Krishna,
                "arjun" | "arjuna" => Speaker::Arjun,
                "sanjay" | "sanjaya" => Speaker::Sanjay,
                "dhritrashtra" | "dhritarashtra" => Speaker::Dhritrashtra,
                _ => Speaker::Other(label.to_string()),
            },
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Krishna => f.write_str("Krishna"),
            Speaker::Arjun => f.write_str("Arjun"),
            Speaker::Sanjay => f.write_str("Sanjay"),
            Speaker::Dhritrashtra => f.write_str("Dhritrashtra"),
            Speaker::Other(s) => f.write_str(s),
        }
    }
}

impl From<String> for Speaker {
    fn from(s: String) -> Self {
        Speaker::from_label(&s)
    }
}

impl From<Speaker> for String {
    fn from(s: Speaker) -> Self {
        s.to_string()
    }
}

/// One verse of the corpus with all of its translations.
///
/// `variants[i]` is variant `i + 1`. Empty strings keep their slot so that
/// indices stay stable, but they never become passages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub verse_id: String,
    pub speaker: Speaker,
    pub sanskrit_text: String,
    pub variants: Vec<String>,
}

impl VerseRecord {
    /// One passage per non-empty variant, in variant order.
    pub fn passages(&self) -> impl Iterator<Item = Passage> + '_ {
        self.variants
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| Passage {
                text: text.clone(),
                metadata: PassageMetadata {
                    verse_id: self.verse_id.clone(),
                    variant_index: i as u32 + 1,
                    speaker: self.speaker.clone(),
                    sanskrit_text: self.sanskrit_text.clone(),
                },
            })
    }
}

/// Metadata attached to every indexed passage and returned with each hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMetadata {
    pub verse_id: String,
    /// 1-based position in the verse's variant list.
    pub variant_index: u32,
    pub speaker: Speaker,
    pub sanskrit_text: String,
}

/// A single translation variant ready to embed.
#[derive(Clone, Debug, PartialEq)]
pub struct Passage {
    pub text: String,
    pub metadata: PassageMetadata,
}

impl Passage {
    /// Deterministic Qdrant point id for `(verse_id, variant_index)`.
    pub fn point_id(&self) -> String {
        point_id(&self.metadata.verse_id, self.metadata.variant_index)
    }
}

/// Stable UUIDv5 derived from `"{verse_id}#{variant_index}"`.
pub fn point_id(verse_id: &str, variant_index: u32) -> String {
    let key = format!("{verse_id}#{variant_index}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}

/// One result of [`VerseStore::search`](crate::VerseStore::search).
#[derive(Clone, Debug, PartialEq)]
pub struct PassageHit {
    pub text: String,
    pub metadata: PassageMetadata,
    pub score: f32,
}
