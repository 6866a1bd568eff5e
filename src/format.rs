//! Page formatting.
//!
//! Composes one page's reassembled text, detected references, and importance
//! annotations into a single markdown-flavored block. Output is byte-stable
//! for identical input and the literal markers below are a contract: the
//! export layer string-matches and strips them.
//!
//! Markers:
//!   page header        `**Page {n}**`
//!   visual block       `**Visual Content:**` / `**Figures:**` / `**Tables:**` / `**Graphs:**`
//!   visual entry       `- **{description}**` (+ `  Caption: *{caption}*`, `  Location: {position}`)
//!   block divider      `---`
//!   text block         `**Text Content:**`
//!   heading section    `### {text}`
//!   bullet             `- {sentence}` or `- **{sentence}**`
//!   empty-page notice  `*No readable text content found on this page.*`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::annotate::annotate_importance;
use crate::models::ExtractedPage;

/// Maximum length for a paragraph section to qualify as a heading.
const HEADING_MAX_CHARS: usize = 80;
/// Maximum word count for the short-phrase heading clause.
const HEADING_MAX_WORDS: usize = 8;
/// Single sentences shorter than this are emitted as one emphasized bullet.
const SHORT_SENTENCE_CHARS: usize = 150;
/// Sentences at or below this length are dropped from bullet lists.
const MIN_BULLET_CHARS: usize = 10;

pub const EMPTY_PAGE_NOTICE: &str = "*No readable text content found on this page.*";

static CAPITALIZED_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z\s]+$").expect("phrase pattern"));
static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.?\s+[A-Z]").expect("numbered heading pattern"));
/// Quick importance check applied per bullet, independent of the annotator.
static IMPORTANT_SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:important|significant|key|critical|essential|note|conclusion|result|finding|figure|table|chart|graph|shows|indicates|demonstrates)",
    )
    .expect("importance pattern")
});

/// Format one extracted page as a markdown-flavored block.
pub fn format_page(page: &ExtractedPage) -> String {
    let mut blocks: Vec<String> = Vec::new();
    blocks.push(format!("**Page {}**", page.page_number));

    let has_visuals = !page.figures.is_empty()
        || !page.tables.is_empty()
        || !page.graphs.is_empty()
        || page.has_images;
    if has_visuals {
        blocks.push(visual_content_block(page));
        blocks.push("---".to_string());
    }

    let sections: Vec<&str> = page
        .text
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sections.is_empty() {
        blocks.push(EMPTY_PAGE_NOTICE.to_string());
        return blocks.join("\n\n");
    }

    blocks.push("**Text Content:**".to_string());
    for section in sections {
        blocks.push(format_section(section));
    }

    blocks.join("\n\n").trim().to_string()
}

fn visual_content_block(page: &ExtractedPage) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("**Visual Content:**".to_string());

    if !page.figures.is_empty() {
        lines.push("**Figures:**".to_string());
        for figure in &page.figures {
            lines.push(format!("- **{}**", figure.description));
            if let Some(caption) = &figure.caption {
                lines.push(format!("  Caption: *{}*", caption));
            }
            lines.push(format!("  Location: {}", figure.position));
        }
    }

    if !page.tables.is_empty() {
        lines.push("**Tables:**".to_string());
        for table in &page.tables {
            lines.push(format!("- **{}**", table.description));
            if let Some(caption) = &table.caption {
                lines.push(format!("  Caption: *{}*", caption));
            }
            lines.push(format!("  Location: {}", table.position));
        }
    }

    if !page.graphs.is_empty() {
        lines.push("**Graphs:**".to_string());
        for graph in &page.graphs {
            lines.push(format!("- **{}** ({})", graph.description, graph.kind.name()));
            if let Some(caption) = &graph.caption {
                lines.push(format!("  Caption: *{}*", caption));
            }
            lines.push(format!("  Location: {}", graph.position));
        }
    }

    if page.has_images && page.figures.is_empty() {
        lines.push("- **Visual elements detected** (images, diagrams, or graphics present)".to_string());
        lines.push(format!("  Location: Page {}", page.page_number));
    }

    lines.join("\n\n")
}

fn format_section(section: &str) -> String {
    if is_heading(section) {
        return format!("### {}", section);
    }

    let sentences = split_sentences(section);

    if sentences.len() == 1 && sentences[0].chars().count() < SHORT_SENTENCE_CHARS {
        // A lone short sentence is treated as an important point.
        return format!("- **{}**", annotate_importance(sentences[0].trim()));
    }

    let mut bullets: Vec<String> = Vec::new();
    for sentence in &sentences {
        let trimmed = sentence.trim();
        if trimmed.chars().count() <= MIN_BULLET_CHARS {
            continue;
        }
        let annotated = annotate_importance(trimmed);
        if IMPORTANT_SENTENCE.is_match(trimmed) {
            bullets.push(format!("- **{}**", annotated));
        } else {
            bullets.push(format!("- {}", annotated));
        }
    }
    bullets.join("\n\n")
}

/// A section is a heading when it is short and looks title-like. Sections
/// ending in sentence punctuation stay bullets unless they are all-uppercase,
/// so short plain sentences are not misfiled as headings.
fn is_heading(section: &str) -> bool {
    if section.chars().count() >= HEADING_MAX_CHARS {
        return false;
    }
    if section == section.to_uppercase() {
        return true;
    }
    if section.ends_with(['.', '!', '?']) {
        return false;
    }
    section.split_whitespace().count() <= HEADING_MAX_WORDS
        || CAPITALIZED_PHRASE.is_match(section)
        || NUMBERED_HEADING.is_match(section)
}

/// Split on sentence-ending punctuation followed by whitespace, keeping the
/// punctuation with its sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            if chars.peek().map(|n| n.is_whitespace()).unwrap_or(false) {
                while chars.peek().map(|n| n.is_whitespace()).unwrap_or(false) {
                    chars.next();
                }
                if !current.trim().is_empty() {
                    sentences.push(current.trim().to_string());
                }
                current.clear();
            }
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences
}
