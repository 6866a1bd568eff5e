//! Visual-reference detection.
//!
//! Scans one page's reassembled text for textual mentions of figures, tables,
//! and graphs. Three independent pattern tables are applied exhaustively and
//! case-insensitively; every match produces one reference record.
//!
//! The tables deliberately overlap: a literal caption ("Figure 3: ...") and a
//! cross-reference ("see Figure 3") on the same page yield two records for the
//! same logical figure. Matches are not deduplicated — downstream counts rely
//! on the raw match totals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{FigureReference, GraphKind, GraphReference, TableReference};

/// Caption-style patterns capture (number, trailing caption); cross-reference
/// patterns capture only the number.
static FIGURE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Figure\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Fig\.\s*(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Image\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Diagram\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Illustration\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Photo\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Picture\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Exhibit\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Plate\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)(?:see|refer to|shown in|as in|according to)\s+Figure\s+(\d+(?:\.\d+)?)",
        r"(?i)(?:see|refer to|shown in|as in|according to)\s+Fig\.\s*(\d+(?:\.\d+)?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("figure pattern"))
    .collect()
});

static TABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Table\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Tab\.\s*(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Schedule\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)Matrix\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
        r"(?i)(?:see|refer to|shown in|as in|according to)\s+Table\s+(\d+(?:\.\d+)?)",
        r"(?i)(?:see|refer to|shown in|as in|according to)\s+Tab\.\s*(\d+(?:\.\d+)?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("table pattern"))
    .collect()
});

/// Each graph pattern carries the kind resolved from its noun group.
static GRAPH_PATTERNS: Lazy<Vec<(Regex, GraphKind)>> = Lazy::new(|| {
    [
        (r"(?i)Chart\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)", GraphKind::Chart),
        (r"(?i)Graph\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)", GraphKind::Graph),
        (r"(?i)Plot\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)", GraphKind::Plot),
        (
            r"(?i)Histogram\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
            GraphKind::Histogram,
        ),
        (
            r"(?i)Bar\s+Chart\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
            GraphKind::Chart,
        ),
        (
            r"(?i)Line\s+Graph\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
            GraphKind::Graph,
        ),
        (
            r"(?i)Pie\s+Chart\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
            GraphKind::Chart,
        ),
        (
            r"(?i)Scatter\s+Plot\s+(\d+(?:\.\d+)?)[:.]?\s*([^\n]*)",
            GraphKind::Plot,
        ),
        (
            r"(?i)(?:see|refer to|shown in|as in|according to)\s+Chart\s+(\d+(?:\.\d+)?)",
            GraphKind::Chart,
        ),
        (
            r"(?i)(?:see|refer to|shown in|as in|according to)\s+Graph\s+(\d+(?:\.\d+)?)",
            GraphKind::Graph,
        ),
    ]
    .iter()
    .map(|(p, kind)| (Regex::new(p).expect("graph pattern"), *kind))
    .collect()
});

/// Detected visual references for one page.
#[derive(Debug, Clone, Default)]
pub struct PageReferences {
    pub figures: Vec<FigureReference>,
    pub tables: Vec<TableReference>,
    pub graphs: Vec<GraphReference>,
}

/// Scan one page's normalized text for figure/table/graph mentions.
pub fn detect_references(text: &str, page_number: usize) -> PageReferences {
    let mut refs = PageReferences::default();

    for pattern in FIGURE_PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            let number = matched_number(&captures);
            refs.figures.push(FigureReference {
                id: format!("fig-{}-{}", page_number, number),
                caption: matched_caption(&captures),
                description: format!("Figure {} on page {}", number, page_number),
                position: format!("Page {}", page_number),
            });
        }
    }

    for pattern in TABLE_PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            let number = matched_number(&captures);
            refs.tables.push(TableReference {
                id: format!("table-{}-{}", page_number, number),
                caption: matched_caption(&captures),
                description: format!("Table {} on page {}", number, page_number),
                position: format!("Page {}", page_number),
            });
        }
    }

    for (pattern, kind) in GRAPH_PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            let number = matched_number(&captures);
            refs.graphs.push(GraphReference {
                id: format!("graph-{}-{}", page_number, number),
                kind: *kind,
                caption: matched_caption(&captures),
                description: format!("{} {} on page {}", kind.label(), number, page_number),
                position: format!("Page {}", page_number),
            });
        }
    }

    refs
}

fn matched_number(captures: &regex::Captures<'_>) -> String {
    captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn matched_caption(captures: &regex::Captures<'_>) -> Option<String> {
    let caption = captures.get(2)?.as_str().trim();
    if caption.is_empty() {
        None
    } else {
        Some(caption.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_and_table_ids_follow_scheme() {
        let text = "Figure 1: Revenue growth\nTable 2 shows quarterly results";
        let refs = detect_references(text, 4);

        let figure = refs.figures.iter().find(|f| f.id == "fig-4-1").unwrap();
        assert!(figure.description.contains("Figure 1"));
        assert_eq!(figure.caption.as_deref(), Some("Revenue growth"));
        assert_eq!(figure.position, "Page 4");

        let table = refs.tables.iter().find(|t| t.id == "table-4-2").unwrap();
        assert!(table.description.contains("Table 2"));
    }

    #[test]
    fn overlapping_patterns_are_not_deduplicated() {
        // A literal caption plus a cross-reference to the same figure must
        // produce two records.
        let text = "Figure 3: Architecture overview. Details are shown in Figure 3.";
        let refs = detect_references(text, 1);
        let for_three: Vec<_> = refs.figures.iter().filter(|f| f.id == "fig-1-3").collect();
        assert!(for_three.len() >= 2);
    }

    #[test]
    fn cross_reference_has_no_caption() {
        let refs = detect_references("as described, see Table 7", 2);
        let table = refs.tables.iter().find(|t| t.id == "table-2-7").unwrap();
        assert!(table.caption.is_none());
    }

    #[test]
    fn graph_kind_resolution() {
        let refs = detect_references("Histogram 4: latency distribution", 1);
        let histogram = refs
            .graphs
            .iter()
            .find(|g| g.kind == GraphKind::Histogram)
            .unwrap();
        assert_eq!(histogram.id, "graph-1-4");
        assert!(histogram.description.starts_with("Histogram 4"));

        let refs = detect_references("Scatter Plot 2: clusters", 1);
        assert!(refs.graphs.iter().any(|g| g.kind == GraphKind::Plot));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let refs = detect_references("figure 9 appears here", 1);
        assert!(refs.figures.iter().any(|f| f.id == "fig-1-9"));
    }

    #[test]
    fn dotted_numbers_are_captured() {
        let refs = detect_references("Fig. 2.1: sub-numbered", 6);
        assert!(refs.figures.iter().any(|f| f.id == "fig-6-2.1"));
    }

    #[test]
    fn empty_text_detects_nothing() {
        let refs = detect_references("", 1);
        assert!(refs.figures.is_empty());
        assert!(refs.tables.is_empty());
        assert!(refs.graphs.is_empty());
    }
}
