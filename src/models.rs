//! Core data models used throughout the pdfnotes pipeline.
//!
//! These types represent the positioned text fragments, per-page extraction
//! results, and generated notes that flow from raw PDF bytes to the final
//! notes document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One positioned piece of text on a page, as surfaced by the PDF reader.
/// Consumed immediately during reassembly and never stored.
#[derive(Debug, Clone)]
pub struct PageFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// A detected textual mention of a figure on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureReference {
    /// `fig-{page}-{number}`, or `fig-{page}-unknown` when no number captured.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub description: String,
    /// Page-level granularity only, e.g. `Page 3`.
    pub position: String,
}

/// A detected textual mention of a table on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReference {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub description: String,
    pub position: String,
}

/// Heuristically resolved kind of a detected graph reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Chart,
    Graph,
    Plot,
    Histogram,
}

impl GraphKind {
    /// Capitalized label used in descriptions ("Chart 3 on page 2").
    pub fn label(&self) -> &'static str {
        match self {
            GraphKind::Chart => "Chart",
            GraphKind::Graph => "Graph",
            GraphKind::Plot => "Plot",
            GraphKind::Histogram => "Histogram",
        }
    }

    /// Lowercase name used in formatted output ("(chart)").
    pub fn name(&self) -> &'static str {
        match self {
            GraphKind::Chart => "chart",
            GraphKind::Graph => "graph",
            GraphKind::Plot => "plot",
            GraphKind::Histogram => "histogram",
        }
    }
}

/// A detected textual mention of a chart, graph, plot, or histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReference {
    pub id: String,
    pub kind: GraphKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub description: String,
    pub position: String,
}

/// One page's extraction result. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Reassembled plain text; empty when the page has no extractable text.
    pub text: String,
    /// Inferred page title (first short line), when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub figures: Vec<FigureReference>,
    pub tables: Vec<TableReference>,
    pub graphs: Vec<GraphReference>,
    /// True when the page carries raster/image paint content.
    pub has_images: bool,
}

/// Whole-document extraction result, consumed by the assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub pages: Vec<ExtractedPage>,
    pub total_pages: usize,
    /// Derived from the source file name with its extension stripped.
    pub title: String,
    pub total_figures: usize,
    pub total_tables: usize,
    pub total_graphs: usize,
}

/// One node of the notes document's content tree. Current output produces one
/// section per page with no subsections, but the type supports arbitrary depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSection {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsections: Option<Vec<NoteSection>>,
}

/// Terminal artifact of the pipeline: the generated notes for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesDocument {
    pub title: String,
    pub summary: String,
    pub sections: Vec<NoteSection>,
    pub key_points: Vec<String>,
    pub tags: Vec<String>,
    pub word_count: usize,
}

/// Status of one file's journey through the pipeline.
///
/// Initial state is always `Processing`; terminal states are `Completed` and
/// `Failed`, with no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Processing => write!(f, "processing"),
            ProcessingStatus::Completed => write!(f, "completed"),
            ProcessingStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Session-visible state for one uploaded file.
///
/// Invariants: `notes` is set iff status is `Completed`; `error` is set iff
/// status is `Failed`; `progress` is monotonically non-decreasing while
/// `Processing`, forced to 100 on completion and reset to 0 on failure.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: ProcessingStatus,
    /// 0–100.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<NotesDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingRecord {
    /// True once the record has reached `Completed` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        self.status != ProcessingStatus::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_kind_labels() {
        assert_eq!(GraphKind::Chart.label(), "Chart");
        assert_eq!(GraphKind::Histogram.name(), "histogram");
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(ProcessingStatus::Processing.to_string(), "processing");
        assert_eq!(ProcessingStatus::Completed.to_string(), "completed");
        assert_eq!(ProcessingStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn notes_document_serializes_without_empty_optionals() {
        let doc = NotesDocument {
            title: "Full Content: sample".to_string(),
            summary: "summary".to_string(),
            sections: vec![NoteSection {
                id: "page-1".to_string(),
                title: "Page 1".to_string(),
                content: "content".to_string(),
                subsections: None,
            }],
            key_points: vec![],
            tags: vec![],
            word_count: 0,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("subsections"));
    }
}
