//! # pdfnotes CLI
//!
//! The `pdfnotes` binary runs the extraction pipeline against local PDF
//! files and writes the generated notes next to the input (or to `--out`).
//!
//! ## Usage
//!
//! ```bash
//! pdfnotes [--config ./pdfnotes.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfnotes process <file>` | Run the full pipeline and write the notes document |
//! | `pdfnotes inspect <file>` | Extraction-only dump: per-page stats and references |
//!
//! ## Examples
//!
//! ```bash
//! # Write report-enhanced-notes.md next to the input
//! pdfnotes process report.pdf
//!
//! # Plain-text notes into a chosen directory, JSON progress on stderr
//! pdfnotes process report.pdf --format text --out ./notes --progress json
//!
//! # Dump the notes document as JSON to a file
//! pdfnotes process report.pdf --format json
//!
//! # Check what the extractor sees without generating notes
//! pdfnotes inspect report.pdf
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use pdfnotes::config::{self, Config};
use pdfnotes::export;
use pdfnotes::extract::extract_document;
use pdfnotes::models::ProcessingStatus;
use pdfnotes::progress::ProgressMode;
use pdfnotes::session::{Session, MIME_PDF};

/// pdfnotes — extract structured study notes from PDF files.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; without it, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "pdfnotes",
    about = "Extract structured study notes from PDF files",
    version,
    long_about = "pdfnotes reassembles the positioned text of a PDF into readable paragraphs, \
    detects references to figures, tables, and graphs, highlights important sentences, and \
    assembles the result into a notes document exportable as Markdown, plain text, or JSON."
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one PDF and write the notes document.
    ///
    /// The output file name follows the export convention: the input name
    /// with its extension stripped, suffixed `-enhanced-notes.md` (markdown),
    /// `-notes.md` (text), or `.json` (json).
    Process {
        /// Path to the PDF file.
        file: PathBuf,

        /// Output directory. Defaults to the input file's directory.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Progress reporting on stderr. Defaults to `human` when stderr is
        /// a TTY, `off` otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressArg>,
    },

    /// Extraction-only inspection of one PDF.
    ///
    /// Prints per-page character counts and detected figure/table/graph
    /// references without assembling a notes document.
    Inspect {
        /// Path to the PDF file.
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Markdown,
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProgressArg {
    Off,
    Human,
    Json,
}

impl From<ProgressArg> for ProgressMode {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::Off => ProgressMode::Off,
            ProgressArg::Human => ProgressMode::Human,
            ProgressArg::Json => ProgressMode::Json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            file,
            out,
            format,
            progress,
        } => {
            run_process(&cfg, &file, out.as_deref(), format, progress).await?;
        }
        Commands::Inspect { file } => {
            run_inspect(&cfg, &file)?;
        }
    }

    Ok(())
}

async fn run_process(
    cfg: &Config,
    file: &Path,
    out: Option<&Path>,
    format: OutputFormat,
    progress: Option<ProgressArg>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mode: ProgressMode = progress
        .map(ProgressMode::from)
        .unwrap_or_else(ProgressMode::default_for_tty);
    let session = Session::with_reporter(cfg.clone(), Arc::from(mode.reporter()));

    let id = session
        .process_file(&file_name, MIME_PDF, bytes)
        .map_err(|e| anyhow::anyhow!("{} rejected: {}", file_name, e))?;
    session.wait(&id).await;

    let record = session
        .record(&id)
        .context("processing record disappeared")?;
    match record.status {
        ProcessingStatus::Completed => {}
        ProcessingStatus::Failed => {
            anyhow::bail!(
                "{}: {}",
                file_name,
                record.error.as_deref().unwrap_or("processing failed")
            );
        }
        ProcessingStatus::Processing => {
            anyhow::bail!("{}: task ended without a terminal status", file_name);
        }
    }
    let notes = record.notes.context("completed record carries no notes")?;

    let out_dir = out
        .map(Path::to_path_buf)
        .or_else(|| cfg.export.out_dir.clone())
        .or_else(|| file.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let (out_name, rendered) = match format {
        OutputFormat::Markdown => (
            export::markdown_file_name(&file_name),
            export::to_markdown(&notes),
        ),
        OutputFormat::Text => (
            export::text_file_name(&file_name),
            export::to_plain_text(&notes),
        ),
        OutputFormat::Json => {
            let stem = Path::new(&file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone());
            (format!("{}.json", stem), export::to_json(&notes)?)
        }
    };
    let out_path = out_dir.join(out_name);
    std::fs::write(&out_path, rendered)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!("process {}", file_name);
    println!("  pages: {}", notes.sections.len());
    println!("  words: {}", notes.word_count);
    println!("  key points: {}", notes.key_points.len());
    if !notes.tags.is_empty() {
        println!("  tags: {}", notes.tags.join(", "));
    }
    println!("  wrote: {}", out_path.display());
    println!("ok");
    Ok(())
}

fn run_inspect(cfg: &Config, file: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let doc = extract_document(&bytes, &file_name, cfg, &pdfnotes::progress::NoProgress)
        .with_context(|| format!("failed to extract {}", file_name))?;

    println!("inspect {}", file_name);
    println!("  title: {}", doc.title);
    println!("  pages: {}", doc.total_pages);
    for page in &doc.pages {
        let title = page.title.as_deref().unwrap_or("-");
        println!(
            "  page {}: {} chars, {} figures, {} tables, {} graphs{}  [{}]",
            page.page_number,
            page.text.len(),
            page.figures.len(),
            page.tables.len(),
            page.graphs.len(),
            if page.has_images { ", images" } else { "" },
            title
        );
    }
    println!(
        "  totals: {} figures, {} tables, {} graphs",
        doc.total_figures, doc.total_tables, doc.total_graphs
    );
    println!("ok");
    Ok(())
}
