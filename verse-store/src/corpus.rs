//! Corpus loader: reads the structured verse table from JSONL.
//!
//! Each non-empty line is one verse. Two row shapes are accepted:
//!
//! ```text
//! {"verse_id": "2.47", "speaker": "Krishna", "sanskrit_text": "...", "variants": ["...", "..."]}
//! {"verse_no": "2.47", "spoken_by": "श्रीभगवान", "sanskrit_text": "...", "translation_1": "...", "translation_2": "..."}
//! ```
//!
//! `translation_N` columns are placed at variant position N; gaps stay empty.
//! `verse_id`/`verse_no` must be a JSON string so ids like `2.10` survive.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::VerseStoreError;
use crate::record::{Speaker, VerseRecord};

const TRANSLATION_PREFIX: &str = "translation_";
/// Highest accepted `N` in a `translation_N` column.
pub const MAX_TRANSLATIONS: usize = 64;

/// Reads every verse from a JSONL file.
///
/// # Errors
/// I/O errors, malformed JSON, non-string, blank or duplicate `verse_id`s,
/// `translation_N` columns past [`MAX_TRANSLATIONS`].
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<VerseRecord>, VerseStoreError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "corpus::load_corpus");
    let file = File::open(path)?;
    let verses = parse_corpus(BufReader::new(file))?;
    info!(path = %path.display(), verses = verses.len(), "corpus loaded");
    Ok(verses)
}

/// Parses JSONL from any buffered reader.
pub fn parse_corpus(reader: impl BufRead) -> Result<Vec<VerseRecord>, VerseStoreError> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row: Map<String, Value> =
            serde_json::from_str(trimmed).map_err(|source| VerseStoreError::Parse {
                line: line_no,
                source,
            })?;
        let verse = verse_from_row(line_no, &row)?;

        if !seen.insert(verse.verse_id.clone()) {
            return Err(VerseStoreError::InvalidRow {
                line: line_no,
                reason: format!("duplicate verse_id {}", verse.verse_id),
            });
        }
        out.push(verse);
    }

    Ok(out)
}

fn verse_from_row(line: usize, row: &Map<String, Value>) -> Result<VerseRecord, VerseStoreError> {
    let invalid = |reason: String| VerseStoreError::InvalidRow { line, reason };

    let verse_id = match ["verse_id", "verse_no"].iter().find_map(|k| row.get(*k)) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(invalid("missing or blank verse_id".into()));
        }
        Some(_) => return Err(invalid("verse_id must be a string".into())),
    };

    let speaker = ["speaker", "spoken_by"]
        .iter()
        .find_map(|k| row.get(*k))
        .and_then(Value::as_str)
        .map(Speaker::from_label)
        .unwrap_or_else(|| Speaker::Other(String::new()));

    let sanskrit_text = row
        .get("sanskrit_text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let variants = match row.get("variants") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.trim().to_string()),
                Value::Null => Ok(String::new()),
                other => Err(invalid(format!("variant is not a string: {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(invalid(format!("`variants` must be an array, got {other}"))),
        None => translation_columns(row).map_err(invalid)?,
    };

    Ok(VerseRecord {
        verse_id,
        speaker,
        sanskrit_text,
        variants,
    })
}

/// Collects `translation_N` columns into a positional list (N is 1-based).
fn translation_columns(row: &Map<String, Value>) -> Result<Vec<String>, String> {
    let mut cols = Vec::new();
    for (k, v) in row {
        let Some(suffix) = k.strip_prefix(TRANSLATION_PREFIX) else {
            continue;
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let n = suffix
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_TRANSLATIONS).contains(n))
            .ok_or_else(|| format!("`{k}` is outside 1..={MAX_TRANSLATIONS}"))?;
        cols.push((n, v.as_str().unwrap_or_default().trim().to_string()));
    }
    cols.sort_by_key(|(n, _)| *n);

    let len = cols.last().map(|(n, _)| *n).unwrap_or(0);
    let mut variants = vec![String::new(); len];
    for (n, text) in cols {
        variants[n - 1] = text;
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    #[test]
    fn parses_both_row_shapes() {
        let jsonl = r#"
{"verse_id": "2.47", "speaker": "Krishna", "sanskrit_text": "कर्मण्येवाधिकारस्ते", "variants": ["duty", "", "action"]}

{"verse_no": "1.1", "spoken_by": "धृतराष्ट्र", "sanskrit_text": "धर्मक्षेत्रे", "translation_2": "second", "translation_10": "tenth", "translation_1": "first"}
"#;
        let verses = parse_corpus(Cursor::new(jsonl)).unwrap();
        assert_eq!(verses.len(), 2);

        assert_eq!(verses[0].verse_id, "2.47");
        assert_eq!(verses[0].variants, vec!["duty", "", "action"]);

        let v = &verses[1];
        assert_eq!(v.verse_id, "1.1");
        assert_eq!(v.speaker, Speaker::Dhritrashtra);
        assert_eq!(v.variants.len(), 10);
        assert_eq!(v.variants[0], "first");
        assert_eq!(v.variants[1], "second");
        assert_eq!(v.variants[9], "tenth");
        assert_eq!(v.passages().count(), 3);
    }

    #[test]
    fn rejects_blank_and_duplicate_ids() {
        let blank = r#"{"verse_id": "  ", "variants": ["x"]}"#;
        assert!(matches!(
            parse_corpus(Cursor::new(blank)),
            Err(VerseStoreError::InvalidRow { line: 1, .. })
        ));

        let dup = "{\"verse_id\": \"2.47\"}\n{\"verse_id\": \"2.47\"}\n";
        assert!(matches!(
            parse_corpus(Cursor::new(dup)),
            Err(VerseStoreError::InvalidRow { line: 2, .. })
        ));
    }

    #[test]
    fn reports_line_of_malformed_json() {
        let bad = "{\"verse_id\": \"1.1\"}\n{not json}\n";
        assert!(matches!(
            parse_corpus(Cursor::new(bad)),
            Err(VerseStoreError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"verse_id": "18.66", "variants": ["surrender"]}}"#).unwrap();
        let verses = load_corpus(f.path()).unwrap();
        assert_eq!(verses[0].verse_id, "18.66");
        assert_eq!(verses[0].speaker, Speaker::Other(String::new()));
    }

    #[test]
    fn numeric_ids_are_rejected() {
        // 2.10 as a JSON number would read back as "2.1".
        let rows = "{\"verse_no\": \"2.1\", \"translation_1\": \"x\"}\n{\"verse_no\": 2.10, \"translation_1\": \"y\"}\n";
        match parse_corpus(Cursor::new(rows)) {
            Err(VerseStoreError::InvalidRow { line, reason }) => {
                assert_eq!(line, 2);
                assert_eq!(reason, "verse_id must be a string");
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }

        let ok = "{\"verse_no\": \"2.1\"}\n{\"verse_no\": \"2.10\"}\n";
        let ids: Vec<_> = parse_corpus(Cursor::new(ok))
            .unwrap()
            .into_iter()
            .map(|v| v.verse_id)
            .collect();
        assert_eq!(ids, vec!["2.1", "2.10"]);
    }

    #[test]
    fn translation_index_is_bounded() {
        for key in [
            "translation_18446744073709551615",
            "translation_100000000",
            "translation_99999999999999999999999",
            "translation_65",
            "translation_0",
        ] {
            let row = format!(r#"{{"verse_no": "1.1", "{key}": "x"}}"#);
            assert!(
                matches!(
                    parse_corpus(Cursor::new(row)),
                    Err(VerseStoreError::InvalidRow { line: 1, .. })
                ),
                "{key} should be rejected"
            );
        }

        let row = format!(r#"{{"verse_no": "1.1", "translation_{MAX_TRANSLATIONS}": "last", "translation_note": "ignored"}}"#);
        let verses = parse_corpus(Cursor::new(row)).unwrap();
        assert_eq!(verses[0].variants.len(), MAX_TRANSLATIONS);
        assert_eq!(verses[0].variants[MAX_TRANSLATIONS - 1], "last");
    }
}
