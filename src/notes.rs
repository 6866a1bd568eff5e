//! Notes assembly.
//!
//! Turns a whole-document extraction result into the final notes document:
//! one section per page, a naive extractive summary, per-page key points, a
//! fixed-vocabulary tag scan, and an aggregate word count.

use crate::config::Config;
use crate::extract::{extract_document, ExtractError};
use crate::format::format_page;
use crate::models::{ExtractedDocument, ExtractedPage, NoteSection, NotesDocument};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Prefix for the generated document title.
const TITLE_PREFIX: &str = "Full Content";
/// Pages whose raw text feeds the summary snippet.
const SUMMARY_PAGES: usize = 3;
/// Key-point sentences must be strictly inside this length range.
const KEY_POINT_MIN_CHARS: usize = 10;
const KEY_POINT_MAX_CHARS: usize = 200;
/// Sentences shorter than this never qualify as key-point candidates.
const KEY_POINT_CANDIDATE_CHARS: usize = 20;

/// Tag vocabulary, in output order.
const TAG_VOCABULARY: [&str; 15] = [
    "introduction",
    "conclusion",
    "analysis",
    "methodology",
    "results",
    "discussion",
    "theory",
    "practice",
    "implementation",
    "evaluation",
    "research",
    "study",
    "data",
    "findings",
    "recommendations",
];

/// Run the full pipeline for one file: extract, format, and assemble.
pub fn generate_notes(
    bytes: &[u8],
    file_name: &str,
    config: &Config,
    reporter: &dyn ProgressReporter,
) -> Result<NotesDocument, ExtractError> {
    let extracted = extract_document(bytes, file_name, config, reporter)?;

    reporter.report(ProgressEvent {
        percent: 85,
        stage: "Processing extracted content...".to_string(),
        page: None,
    });
    let sections = page_sections(&extracted);

    reporter.report(ProgressEvent {
        percent: 95,
        stage: "Finalizing notes structure...".to_string(),
        page: None,
    });
    let notes = NotesDocument {
        title: format!("{}: {}", TITLE_PREFIX, extracted.title),
        summary: summarize(&extracted, config.pipeline.summary_chars),
        sections,
        key_points: key_points(&extracted.pages, config.pipeline.max_key_points),
        tags: tags(&extracted.pages, config.pipeline.max_tags),
        word_count: word_count(&extracted.pages),
    };

    reporter.report(ProgressEvent {
        percent: 100,
        stage: "Complete!".to_string(),
        page: None,
    });

    Ok(notes)
}

/// Assemble a notes document from an already-extracted document.
pub fn assemble_notes(extracted: &ExtractedDocument, config: &Config) -> NotesDocument {
    NotesDocument {
        title: format!("{}: {}", TITLE_PREFIX, extracted.title),
        summary: summarize(extracted, config.pipeline.summary_chars),
        sections: page_sections(extracted),
        key_points: key_points(&extracted.pages, config.pipeline.max_key_points),
        tags: tags(&extracted.pages, config.pipeline.max_tags),
        word_count: word_count(&extracted.pages),
    }
}

fn page_sections(extracted: &ExtractedDocument) -> Vec<NoteSection> {
    extracted
        .pages
        .iter()
        .map(|page| NoteSection {
            id: format!("page-{}", page.page_number),
            title: page
                .title
                .clone()
                .unwrap_or_else(|| format!("Page {}", page.page_number)),
            content: format_page(page),
            subsections: None,
        })
        .collect()
}

/// Naive extractive summary: page count plus the first pages' leading text.
/// Not semantic summarization.
fn summarize(extracted: &ExtractedDocument, summary_chars: usize) -> String {
    let snippet: String = extracted
        .pages
        .iter()
        .take(SUMMARY_PAGES)
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(summary_chars)
        .collect();
    format!(
        "This document contains {} pages of content. {}...",
        extracted.total_pages, snippet
    )
}

/// First qualifying sentence of each page, in page order, capped at `max`.
fn key_points(pages: &[ExtractedPage], max: usize) -> Vec<String> {
    let mut points = Vec::new();
    for page in pages {
        if page.text.is_empty() {
            continue;
        }
        let first = page
            .text
            .split(['.', '!', '?'])
            .map(str::trim)
            .find(|s| s.chars().count() > KEY_POINT_CANDIDATE_CHARS);
        if let Some(sentence) = first {
            let chars = sentence.chars().count();
            if chars > KEY_POINT_MIN_CHARS && chars < KEY_POINT_MAX_CHARS {
                points.push(format!("Page {}: {}", page.page_number, sentence));
            }
        }
    }
    points.truncate(max);
    points
}

/// Intersect the fixed vocabulary against the lower-cased document text.
/// Order follows the vocabulary, not discovery; matching is naive substring
/// search on the bare word or its trailing-"s" plural.
fn tags(pages: &[ExtractedPage], max: usize) -> Vec<String> {
    let all_text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut found: Vec<String> = TAG_VOCABULARY
        .iter()
        .filter(|tag| {
            all_text.contains(*tag) || all_text.contains(&format!("{}s", tag))
        })
        .map(|tag| tag.to_string())
        .collect();
    found.truncate(max);
    found
}

fn word_count(pages: &[ExtractedPage]) -> usize {
    pages
        .iter()
        .map(|p| p.text.split_whitespace().count())
        .sum()
}
