//! Glyph stream reassembly.
//!
//! PDF pages carry no native line or paragraph structure — only positioned
//! text fragments. This module rebuilds readable text from fragment geometry:
//! a large vertical jump starts a new paragraph, a large horizontal gap on the
//! same line becomes a word/column space.

use crate::config::ReassemblyConfig;
use crate::models::PageFragment;

/// Rebuild one page's plain text from its ordered fragments.
///
/// Returns an empty string for a page with no non-empty fragments; the page
/// formatter treats that as "no extractable text", not an error.
pub fn reassemble_page(fragments: &[PageFragment], config: &ReassemblyConfig) -> String {
    let mut raw = String::new();
    let mut last_y: Option<f64> = None;
    let mut last_right: Option<f64> = None;

    for fragment in fragments {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }

        if let Some(prev_y) = last_y {
            if (prev_y - fragment.y).abs() > config.line_break_threshold {
                raw.push_str("\n\n");
            } else if let Some(prev_right) = last_right {
                if fragment.x - prev_right > config.word_gap_threshold {
                    raw.push(' ');
                }
            }
        }

        raw.push_str(text);

        // Prevent word-gluing between adjacent fragments on the same line.
        if !ends_in_punctuation_or_space(text) {
            raw.push(' ');
        }

        last_y = Some(fragment.y);
        last_right = Some(fragment.x + fragment.width);
    }

    normalize(&raw)
}

fn ends_in_punctuation_or_space(text: &str) -> bool {
    text.chars()
        .last()
        .map(|c| matches!(c, '.' | '!' | '?' | ':' | ';' | ',') || c.is_whitespace())
        .unwrap_or(true)
}

/// Cleanup pass: collapse repeated paragraph breaks to exactly one `\n\n`,
/// collapse whitespace runs within a paragraph to single spaces, strip
/// indentation after breaks, and trim the whole result.
fn normalize(raw: &str) -> String {
    let paragraphs: Vec<String> = raw
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect();
    paragraphs.join("\n\n")
}
