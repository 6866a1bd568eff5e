//! # pdfnotes
//!
//! A local-first PDF study-notes extraction pipeline.
//!
//! pdfnotes turns the raw bytes of a PDF into a structured notes document:
//! positioned text fragments are reassembled into readable paragraphs,
//! textual references to figures/tables/graphs are detected per page, key
//! sentences are emphasized, and everything is aggregated into sections,
//! a summary, key points, and tags. Processing runs as one asynchronous
//! task per file with progress reporting, tracked by an in-memory session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌──────────┐
//! │  reader   │──▶│ reassemble │──▶│  detect   │──▶│  format   │
//! │  (lopdf)  │   │ fragments  │   │ fig/tab/  │   │ annotate  │
//! └──────────┘   │ → text     │   │ graph refs│   │ markdown  │
//!                └────────────┘   └──────────┘   └────┬─────┘
//!                                                      │
//!                      ┌───────────────────────────────┤
//!                      ▼                               ▼
//!                ┌──────────┐                    ┌──────────┐
//!                │  notes    │───────────────────▶│  export   │
//!                │ assembler │                    │ md/txt/json│
//!                └────┬─────┘                    └──────────┘
//!                     │
//!                     ▼
//!                ┌──────────┐
//!                │ session   │  async tasks + progress + history
//!                └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pdfnotes process report.pdf                 # write report-enhanced-notes.md
//! pdfnotes process report.pdf --format json   # dump the NotesDocument as JSON
//! pdfnotes inspect report.pdf                 # per-page extraction stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`reader`] | PDF parsing boundary (lopdf) |
//! | [`reassemble`] | Fragment-to-text reassembly |
//! | [`detect`] | Figure/table/graph reference detection |
//! | [`annotate`] | Importance annotation |
//! | [`format`] | Per-page markdown formatting |
//! | [`extract`] | Per-document extraction driver |
//! | [`notes`] | Notes document assembly |
//! | [`progress`] | Progress-event contract |
//! | [`session`] | Async processing session controller |
//! | [`export`] | Markdown / plain-text / JSON export |

pub mod annotate;
pub mod config;
pub mod detect;
pub mod export;
pub mod extract;
pub mod format;
pub mod models;
pub mod notes;
pub mod progress;
pub mod reader;
pub mod reassemble;
pub mod session;
