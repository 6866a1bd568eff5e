//! CLI integration tests: run the built binary against generated PDF files.

use std::process::Command;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

fn pdfnotes_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("pdfnotes");
    path
}

/// Single-page PDF with one line of text.
fn one_page_pdf(line: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 700.into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(line)]),
        Operation::new("ET", vec![]),
    ];
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        Content { operations }.encode().unwrap(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn process_writes_markdown_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.pdf");
    std::fs::write(
        &input,
        one_page_pdf("The analysis shows a significant result in the data."),
    )
    .unwrap();

    let output = Command::new(pdfnotes_binary())
        .args(["process", input.to_str().unwrap(), "--progress", "off"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("process report.pdf"));
    assert!(stdout.contains("ok"));

    let exported = dir.path().join("report-enhanced-notes.md");
    let markdown = std::fs::read_to_string(exported).unwrap();
    assert!(markdown.starts_with("# Full Content: report"));
    assert!(markdown.contains("## Document Summary"));
}

#[test]
fn process_json_format_dumps_the_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.pdf");
    std::fs::write(&input, one_page_pdf("Plain body text for the json dump.")).unwrap();

    let output = Command::new(pdfnotes_binary())
        .args([
            "process",
            input.to_str().unwrap(),
            "--format",
            "json",
            "--progress",
            "off",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let exported = dir.path().join("doc.json");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(exported).unwrap()).unwrap();
    assert_eq!(value["title"], "Full Content: doc");
    assert_eq!(value["sections"].as_array().unwrap().len(), 1);
}

#[test]
fn process_rejects_non_pdf_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fake.pdf");
    std::fs::write(&input, b"this is not a pdf").unwrap();

    let output = Command::new(pdfnotes_binary())
        .args(["process", input.to_str().unwrap(), "--progress", "off"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fake.pdf"));
}

#[test]
fn inspect_prints_per_page_stats() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("stats.pdf");
    std::fs::write(&input, one_page_pdf("Figure 1: Revenue growth")).unwrap();

    let output = Command::new(pdfnotes_binary())
        .args(["inspect", input.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("inspect stats.pdf"));
    assert!(stdout.contains("pages: 1"));
    assert!(stdout.contains("1 figures"));
    assert!(stdout.contains("ok"));
}
