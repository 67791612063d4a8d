//! Prompt templates for query expansion and verse explanation.

/// Asks for `count` paraphrases of `question`, one per line.
pub fn expansion_prompt(question: &str, count: usize) -> String {
    format!(
        "You are an AI assistant helping improve information retrieval. \
         Generate {} different variations of the given user question. \
         Provide each variation on a new line.\n\
         Original question: {question}",
        number_word(count)
    )
}

/// Grounded explanation request: verse id, chosen translation, Sanskrit source.
pub fn explanation_prompt(
    verse_id: &str,
    translation: &str,
    sanskrit_text: &str,
    max_tokens: u32,
) -> String {
    format!(
        "In the verse (shlok) {verse_id}, it is explained:\n\
         \"{translation}\"\n\n\
         Provide a clear and insightful explanation in English within {max_tokens} tokens.\n\n\
         The verse that explains this is:\n\
         {sanskrit_text}"
    )
}

fn number_word(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS.get(n).map_or_else(|| n.to_string(), |w| w.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expansion_prompt_names_count_and_question() {
        let p = expansion_prompt("What is dharma?", 5);
        assert!(p.contains("Generate five different variations"));
        assert!(p.contains("each variation on a new line"));
        assert!(p.ends_with("Original question: What is dharma?"));
        assert!(expansion_prompt("q", 12).contains("Generate 12 different"));
    }

    #[test]
    fn explanation_prompt_embeds_grounding() {
        let p = explanation_prompt("2.47", "You have a right to work", "कर्मण्येवाधिकारस्ते", 200);
        assert_eq!(
            p,
            "In the verse (shlok) 2.47, it is explained:\n\
             \"You have a right to work\"\n\n\
             Provide a clear and insightful explanation in English within 200 tokens.\n\n\
             The verse that explains this is:\n\
             कर्मण्येवाधिकारस्ते"
        );
    }
}
