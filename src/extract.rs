//! Per-document extraction driver.
//!
//! Walks a PDF page by page in order, reassembling text and detecting visual
//! references, and aggregates the results into an [`ExtractedDocument`].
//! Failure is all-or-nothing at the document level: a page that parses but
//! yields no text is represented as an empty page, while a page that cannot
//! be read aborts the whole document.

use std::path::Path;

use crate::config::Config;
use crate::detect::detect_references;
use crate::models::{ExtractedDocument, ExtractedPage};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::reader::{LopdfSource, PageSource, ReadError};
use crate::reassemble::reassemble_page;

/// Progress checkpoint once the document structure is loaded.
const STRUCTURE_LOADED_PERCENT: u8 = 5;
/// Upper bound of the per-page extraction progress range.
const EXTRACTION_DONE_PERCENT: u8 = 85;

/// Whole-document extraction failure.
#[derive(Debug)]
pub enum ExtractError {
    /// The byte stream could not be opened as a PDF.
    Open(ReadError),
    /// A page could not be read mid-extraction.
    Page(ReadError),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Open(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Page(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Open(e) | ExtractError::Page(e) => Some(e),
        }
    }
}

/// Extract every page of the document, in page order.
pub fn extract_document(
    bytes: &[u8],
    file_name: &str,
    config: &Config,
    reporter: &dyn ProgressReporter,
) -> Result<ExtractedDocument, ExtractError> {
    reporter.report(ProgressEvent {
        percent: STRUCTURE_LOADED_PERCENT,
        stage: "Reading PDF structure...".to_string(),
        page: None,
    });

    let source = LopdfSource::from_bytes(bytes).map_err(ExtractError::Open)?;
    extract_from_source(&source, file_name, config, reporter)
}

/// Extraction over any [`PageSource`]; split out so tests can drive the
/// pipeline with synthetic fragments.
pub fn extract_from_source(
    source: &dyn PageSource,
    file_name: &str,
    config: &Config,
    reporter: &dyn ProgressReporter,
) -> Result<ExtractedDocument, ExtractError> {
    let total_pages = source.page_count();
    let mut pages = Vec::with_capacity(total_pages);
    let mut total_figures = 0;
    let mut total_tables = 0;
    let mut total_graphs = 0;

    for page_number in 1..=total_pages {
        reporter.report(ProgressEvent {
            percent: page_percent(page_number, total_pages),
            stage: format!("Extracting content from page {}...", page_number),
            page: Some(page_number),
        });

        let raw = source.page(page_number).map_err(ExtractError::Page)?;
        let text = reassemble_page(&raw.fragments, &config.reassembly);
        let references = detect_references(&text, page_number);

        total_figures += references.figures.len();
        total_tables += references.tables.len();
        total_graphs += references.graphs.len();

        log::debug!(
            "page {}: {} chars, {} figures, {} tables, {} graphs",
            page_number,
            text.len(),
            references.figures.len(),
            references.tables.len(),
            references.graphs.len()
        );

        pages.push(ExtractedPage {
            page_number,
            text: text.clone(),
            title: infer_page_title(&text),
            figures: references.figures,
            tables: references.tables,
            graphs: references.graphs,
            has_images: raw.has_images,
        });
    }

    Ok(ExtractedDocument {
        pages,
        total_pages,
        title: document_title(file_name, source),
        total_figures,
        total_tables,
        total_graphs,
    })
}

/// Map page completion onto the 5–85% progress range.
fn page_percent(page_number: usize, total_pages: usize) -> u8 {
    if total_pages == 0 {
        return STRUCTURE_LOADED_PERCENT;
    }
    let span = f64::from(EXTRACTION_DONE_PERCENT - STRUCTURE_LOADED_PERCENT);
    let fraction = page_number as f64 / total_pages as f64;
    (f64::from(STRUCTURE_LOADED_PERCENT) + fraction * span).round() as u8
}

/// The first line works as a page title when it is short but not trivial.
fn infer_page_title(text: &str) -> Option<String> {
    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    if first_line.len() > 5 && first_line.len() < 100 {
        Some(first_line.to_string())
    } else {
        None
    }
}

/// Document title: source file name with its extension stripped. When the
/// name yields no stem, the document's own metadata title fills in.
fn document_title(file_name: &str, source: &dyn PageSource) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .or_else(|| source.metadata_title())
        .unwrap_or_else(|| file_name.to_string())
}
