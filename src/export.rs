//! Notes document export.
//!
//! Derives the shareable text representations from a [`NotesDocument`]:
//! a Markdown document, a plain-text rendering for clipboard copy, and a
//! JSON dump. The Markdown path string-matches the literal markers emitted
//! by the page formatter, so the two modules form one contract.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::NotesDocument;

static PAGE_HEADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*Page \d+\*\*$").expect("page header pattern"));
static FIGURE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- \*\*Figure ").expect("figure entry pattern"));
static TABLE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- \*\*Table ").expect("table entry pattern"));
static GRAPH_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- \*\*(?:Chart|Graph|Plot|Histogram) ").expect("graph entry pattern"));

/// Scaffold lines emitted by the page formatter that a standalone Markdown
/// document does not need; the section heading already carries the context.
const SCAFFOLD_LINES: [&str; 5] = [
    "**Visual Content:**",
    "**Figures:**",
    "**Tables:**",
    "**Graphs:**",
    "**Text Content:**",
];

/// Render the notes as a standalone Markdown document.
pub fn to_markdown(notes: &NotesDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", notes.title));
    out.push_str("## Document Summary\n\n");
    out.push_str(&notes.summary);
    out.push_str("\n\n");

    let figures: usize = notes
        .sections
        .iter()
        .map(|s| FIGURE_ENTRY.find_iter(&s.content).count())
        .sum();
    let tables: usize = notes
        .sections
        .iter()
        .map(|s| TABLE_ENTRY.find_iter(&s.content).count())
        .sum();
    let graphs: usize = notes
        .sections
        .iter()
        .map(|s| GRAPH_ENTRY.find_iter(&s.content).count())
        .sum();
    if figures + tables + graphs > 0 {
        out.push_str("## Visual Content Summary\n\n");
        out.push_str(&format!(
            "This document contains {} figure(s), {} table(s), and {} graph(s)/chart(s).\n\n",
            figures, tables, graphs
        ));
    }

    if !notes.key_points.is_empty() {
        out.push_str("## Key Points\n\n");
        for (i, point) in notes.key_points.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, point));
        }
        out.push('\n');
    }

    out.push_str("## Complete PDF Content\n\n");
    for section in &notes.sections {
        out.push_str(&format!("### {}\n\n", section.title));
        out.push_str(&clean_section_content(&section.content));
        out.push_str("\n\n---\n\n");
    }

    out.trim_end().to_string() + "\n"
}

/// Strip the formatter's scaffold from one section's content: page-header
/// lines and block labels go, inner headings are demoted to bold (the export
/// reserves `###` for section titles), bullets and bold survive untouched.
fn clean_section_content(content: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if PAGE_HEADER_LINE.is_match(trimmed) {
            continue;
        }
        if SCAFFOLD_LINES.contains(&trimmed) {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix("### ") {
            lines.push(format!("**{}**", heading));
            continue;
        }
        lines.push(line.to_string());
    }
    collapse_blank_runs(&lines).trim().to_string()
}

/// Join lines, never letting more than one blank line through.
fn collapse_blank_runs(lines: &[String]) -> String {
    let mut out = String::new();
    let mut previous_blank = false;
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        previous_blank = blank;
    }
    out
}

/// Plain-text rendering for clipboard copy: no markers are stripped, sections
/// appear with their raw titles and content.
pub fn to_plain_text(notes: &NotesDocument) -> String {
    let mut out = String::new();
    out.push_str(&notes.title);
    out.push_str("\n\n");
    out.push_str(&notes.summary);
    out.push_str("\n\n");

    if !notes.key_points.is_empty() {
        out.push_str("Key Points:\n");
        for (i, point) in notes.key_points.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, point));
        }
        out.push('\n');
    }

    for section in &notes.sections {
        out.push_str(&section.title);
        out.push('\n');
        out.push_str(&section.content);
        out.push_str("\n\n");
    }

    out.trim_end().to_string() + "\n"
}

/// Pretty-printed JSON dump of the whole document.
pub fn to_json(notes: &NotesDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(notes)
}

/// `report.pdf` → `report-enhanced-notes.md`.
pub fn markdown_file_name(original: &str) -> String {
    format!("{}-enhanced-notes.md", file_stem(original))
}

/// `report.pdf` → `report-notes.md`.
pub fn text_file_name(original: &str) -> String {
    format!("{}-notes.md", file_stem(original))
}

fn file_stem(original: &str) -> String {
    std::path::Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| original.to_string())
}
