//! Query expansion: one question in, several paraphrases out.

use ai_llm_service::GenerateOptions;
use tracing::{debug, warn};

use crate::{backend::TextGenerator, error::PipelineError, prompt::expansion_prompt};

/// Asks the generator for `count` paraphrases of `question`.
///
/// The result holds whatever usable lines came back, which may be more or
/// fewer than `count`. The question is forwarded as-is.
///
/// # Errors
/// [`PipelineError::Expansion`] if the call fails,
/// [`PipelineError::EmptyExpansion`] if no usable line came back.
pub async fn expand_question(
    generator: &dyn TextGenerator,
    question: &str,
    count: usize,
    opts: GenerateOptions,
) -> Result<Vec<String>, PipelineError> {
    let prompt = expansion_prompt(question, count);
    let raw = generator
        .complete(&prompt, opts)
        .await
        .map_err(PipelineError::Expansion)?;

    let variations = parse_variations(&raw);
    if variations.is_empty() {
        return Err(PipelineError::EmptyExpansion);
    }
    if variations.len() != count {
        warn!(
            requested = count,
            returned = variations.len(),
            "generator returned a different number of variations"
        );
    }
    for (i, v) in variations.iter().enumerate() {
        debug!(n = i + 1, variation = %v, "query variation");
    }
    Ok(variations)
}

/// One variation per non-blank line, with list markers stripped.
pub fn parse_variations(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|l| strip_list_marker(l.trim()).trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes a leading `1.`, `2)`, `-`, `*` or `•` marker.
fn strip_list_marker(line: &str) -> &str {
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest;
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if after.starts_with(char::is_whitespace) {
                return after;
            }
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_and_numbered_lines() {
        let raw = "\n1. What is karma?\n2) How should I act?\n\n- Why act without attachment?\n   plain line  \n";
        assert_eq!(
            parse_variations(raw),
            vec![
                "What is karma?",
                "How should I act?",
                "Why act without attachment?",
                "plain line"
            ]
        );
    }

    #[test]
    fn keeps_leading_numbers_that_are_not_markers() {
        assert_eq!(
            parse_variations("18 chapters of the Gita?\n2.47 meaning?"),
            vec!["18 chapters of the Gita?", "2.47 meaning?"]
        );
    }

    #[tokio::test]
    async fn returns_backend_line_count_even_if_not_requested_count() {
        let generator = ScriptedGenerator::new(vec![Ok("a\nb\nc".into())]);
        let out = expand_question(&generator, "q", 5, GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(out, vec!["a", "b", "c"]);

        let (prompt, _) = generator.calls().remove(0);
        assert!(prompt.contains("Generate five different variations"));
    }

    #[tokio::test]
    async fn interior_blank_lines_do_not_count_as_variations() {
        assert_eq!(parse_variations("a\n\nb"), vec!["a", "b"]);

        let generator = ScriptedGenerator::new(vec![Ok("a\n\nb".into())]);
        let out = expand_question(&generator, "q", 3, GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn blank_response_is_an_expansion_failure() {
        let generator = ScriptedGenerator::new(vec![Ok("  \n\n".into())]);
        let err = expand_question(&generator, "q", 5, GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyExpansion));
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let generator = ScriptedGenerator::new(vec![Err("boom".into())]);
        let err = expand_question(&generator, "", 5, GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Expansion(_)));
        assert!(err.to_string().contains("boom"));
    }
}
