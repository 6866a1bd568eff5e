//! Importance annotation.
//!
//! Best-effort text decoration, not NLP: independent cue-category patterns
//! each wrap their matches in `**…**`. Categories may overlap and the emitted
//! text is not rewritten for idempotence — a downstream renderer must treat
//! doubled or nested bold markers as a toggle.

use once_cell::sync::Lazy;
use regex::Regex;

/// Cue categories, applied in order. Each fires independently.
static EMPHASIS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Key terms
        r"(?i)(?:key|important|significant|critical|essential|fundamental|primary|main|major|crucial|vital)\s+(?:point|concept|idea|principle|factor|element|aspect|finding|result|conclusion)",
        // Conclusions and results
        r"(?i)(?:conclusion|result|finding|outcome|summary|therefore|thus|hence|consequently|in summary|to conclude|finally)",
        // Explicit emphasis
        r"(?i)(?:note that|it is important|significantly|remarkably|notably|particularly|especially|crucially|most importantly|above all)",
        // Percentages and comma-grouped numbers
        r"\d+(?:\.\d+)?%|\d+(?:,\d{3})*(?:\.\d+)?",
        // Definitions
        r"(?i)(?:defined as|refers to|means|is the|represents|can be described as)",
        // Strong modal and universal words
        r"(?i)(?:must|should|will|always|never|all|every|each|only|solely|exclusively)",
        // Research findings
        r"(?i)(?:research shows|studies indicate|evidence suggests|data reveals|analysis shows)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("emphasis pattern"))
    .collect()
});

/// Wrap every cue match in bold markers, one category at a time.
pub fn annotate_importance(text: &str) -> String {
    let mut annotated = text.to_string();
    for pattern in EMPHASIS_PATTERNS.iter() {
        annotated = pattern.replace_all(&annotated, "**${0}**").into_owned();
    }
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_term_is_bolded() {
        let out = annotate_importance("this is a key point to remember");
        assert!(out.contains("**key point**"));
    }

    #[test]
    fn percentage_is_bolded() {
        let out = annotate_importance("growth reached 42.5% last year");
        assert!(out.contains("**42.5%**"));
    }

    #[test]
    fn comma_grouped_number_is_bolded() {
        let out = annotate_importance("a sample of 1,234 users");
        assert!(out.contains("**1,234**"));
    }

    #[test]
    fn definition_phrase_is_bolded() {
        let out = annotate_importance("entropy is defined as disorder");
        assert!(out.contains("**defined as**"));
    }

    #[test]
    fn modal_word_is_bolded() {
        let out = annotate_importance("operators must comply");
        assert!(out.contains("**must**"));
    }

    #[test]
    fn categories_fire_independently() {
        // "significant finding" triggers the key-term category; "finding"
        // alone also triggers the conclusion category on the second pass,
        // nesting the markers. That nesting is accepted output.
        let out = annotate_importance("a significant finding emerged");
        assert!(out.contains("significant"));
        assert!(out.matches("**").count() >= 4);
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(annotate_importance("the cat sat"), "the cat sat");
    }
}
