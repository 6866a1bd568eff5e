//! Processing session controller.
//!
//! Owns the in-memory list of processing records and runs one asynchronous
//! pipeline task per accepted file. Records are mutated only through keyed
//! in-place updates (matched by record id), so concurrent tasks never step on
//! each other's state. History lives for the session only; nothing persists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::models::{ProcessingRecord, ProcessingStatus};
use crate::notes::generate_notes;
use crate::progress::{NoProgress, ProgressEvent, ProgressReporter};

/// The only content type the pipeline accepts.
pub const MIME_PDF: &str = "application/pdf";

/// Fallback message when a task fails without a usable error string.
const GENERIC_FAILURE: &str = "Processing failed";

/// Rejection before any processing starts. A rejected file never gets a
/// processing record.
#[derive(Debug)]
pub enum ValidationError {
    /// Declared content type is not PDF.
    UnsupportedType(String),
    /// File exceeds the configured size limit.
    TooLarge { size: u64, limit: u64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnsupportedType(content_type) => {
                write!(f, "unsupported file type: {}", content_type)
            }
            ValidationError::TooLarge { size, limit } => {
                write!(f, "file is {} bytes, limit is {} bytes", size, limit)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

type RecordStore = Arc<Mutex<Vec<ProcessingRecord>>>;

/// One session's processing state: the record list plus the join handles of
/// in-flight tasks.
pub struct Session {
    config: Config,
    records: RecordStore,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    reporter: Arc<dyn ProgressReporter>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_reporter(config, Arc::new(NoProgress))
    }

    /// A session whose tasks also forward progress events to `reporter`,
    /// in addition to updating the record store.
    pub fn with_reporter(config: Config, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            config,
            records: Arc::new(Mutex::new(Vec::new())),
            tasks: Mutex::new(HashMap::new()),
            reporter,
        }
    }

    /// Validate and start processing one file. Validation failures reject the
    /// file before a record exists; an accepted file gets a `Processing`
    /// record immediately and the returned id can be used to track it.
    pub fn process_file(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ValidationError> {
        if content_type != MIME_PDF {
            return Err(ValidationError::UnsupportedType(content_type.to_string()));
        }
        let size = bytes.len() as u64;
        if size > self.config.pipeline.max_file_bytes {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.config.pipeline.max_file_bytes,
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        let record = ProcessingRecord {
            id: id.clone(),
            name: name.to_string(),
            size,
            content_type: content_type.to_string(),
            uploaded_at: Utc::now(),
            status: ProcessingStatus::Processing,
            progress: 0,
            current_page: None,
            stage: None,
            notes: None,
            error: None,
        };
        self.records.lock().unwrap().push(record);

        let task = spawn_pipeline_task(
            id.clone(),
            name.to_string(),
            bytes,
            self.config.clone(),
            Arc::clone(&self.records),
            Arc::clone(&self.reporter),
        );
        self.tasks.lock().unwrap().insert(id.clone(), task);

        log::info!("processing started: {} ({} bytes)", name, size);
        Ok(id)
    }

    /// Wait for a file's task to reach a terminal state. A task that panicked
    /// is converted into a failed record rather than left `Processing`.
    pub async fn wait(&self, id: &str) {
        let task = self.tasks.lock().unwrap().remove(id);
        if let Some(task) = task {
            if task.await.is_err() {
                fail_record(&self.records, id, GENERIC_FAILURE.to_string());
            }
        }
    }

    /// Snapshot of one record by id.
    pub fn record(&self, id: &str) -> Option<ProcessingRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Snapshot of the whole session history, in upload order.
    pub fn records(&self) -> Vec<ProcessingRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Remove one record from the history. Returns false if the id is unknown.
    pub fn delete(&self, id: &str) -> bool {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }

    /// Drop the whole history.
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}

fn spawn_pipeline_task(
    id: String,
    name: String,
    bytes: Vec<u8>,
    config: Config,
    records: RecordStore,
    tee: Arc<dyn ProgressReporter>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reporter = RecordProgress {
            records: Arc::clone(&records),
            id: id.clone(),
            tee,
        };
        let task_id = id.clone();
        let result = tokio::task::spawn_blocking(move || {
            generate_notes(&bytes, &name, &config, &reporter)
        })
        .await;

        match result {
            Ok(Ok(notes)) => {
                let mut records = records.lock().unwrap();
                if let Some(record) = records.iter_mut().find(|r| r.id == task_id) {
                    record.status = ProcessingStatus::Completed;
                    record.progress = 100;
                    record.current_page = None;
                    record.stage = None;
                    record.notes = Some(notes);
                    log::info!("processing completed: {}", record.name);
                }
            }
            Ok(Err(e)) => {
                log::warn!("processing failed: {}", e);
                let message = e.to_string();
                let message = if message.is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    message
                };
                fail_record(&records, &task_id, message);
            }
            Err(_) => {
                log::warn!("processing task panicked");
                fail_record(&records, &task_id, GENERIC_FAILURE.to_string());
            }
        }
    })
}

/// Terminal transition to `Failed`: progress resets to 0, the error message
/// is captured, and no notes are attached.
fn fail_record(records: &RecordStore, id: &str, message: String) {
    let mut records = records.lock().unwrap();
    if let Some(record) = records.iter_mut().find(|r| r.id == id) {
        record.status = ProcessingStatus::Failed;
        record.progress = 0;
        record.current_page = None;
        record.stage = None;
        record.notes = None;
        record.error = Some(message);
    }
}

/// Reporter that applies progress events to one record by id. Percent is
/// clamped to be non-decreasing, and updates are ignored once the record has
/// reached a terminal state.
struct RecordProgress {
    records: RecordStore,
    id: String,
    tee: Arc<dyn ProgressReporter>,
}

impl ProgressReporter for RecordProgress {
    fn report(&self, event: ProgressEvent) {
        {
            let mut records = self.records.lock().unwrap();
            if let Some(record) = records.iter_mut().find(|r| r.id == self.id) {
                if !record.is_terminal() {
                    record.progress = record.progress.max(event.percent);
                    record.stage = Some(event.stage.clone());
                    record.current_page = event.page;
                }
            }
        }
        self.tee.report(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Minimal one-page PDF whose page shows the given lines of text.
    fn pdf_with_lines(lines: &[&str]) -> Vec<u8> {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    72.into(),
                    (720 - (i as i64) * 20).into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(*line)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

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

    #[tokio::test]
    async fn rejects_unsupported_type_without_record() {
        let session = Session::new(Config::default());
        let err = session
            .process_file("notes.txt", "text/plain", b"hello".to_vec())
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType(_)));
        assert!(session.records().is_empty());
    }

    #[tokio::test]
    async fn rejects_oversized_file_without_record() {
        let mut config = Config::default();
        config.pipeline.max_file_bytes = 8;
        let session = Session::new(config);
        let err = session
            .process_file("big.pdf", MIME_PDF, vec![0u8; 16])
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooLarge { size: 16, limit: 8 }
        ));
        assert!(session.records().is_empty());
    }

    #[tokio::test]
    async fn valid_pdf_completes_with_notes() {
        let bytes = pdf_with_lines(&[
            "Quarterly Findings",
            "The analysis shows a significant upward trend in adoption.",
        ]);
        let session = Session::new(Config::default());
        let id = session
            .process_file("report.pdf", MIME_PDF, bytes)
            .unwrap();
        session.wait(&id).await;

        let record = session.record(&id).unwrap();
        assert_eq!(record.status, ProcessingStatus::Completed);
        assert_eq!(record.progress, 100);
        assert!(record.notes.is_some());
        assert!(record.error.is_none());
        let notes = record.notes.unwrap();
        assert_eq!(notes.title, "Full Content: report");
        assert_eq!(notes.sections.len(), 1);
    }

    #[tokio::test]
    async fn non_pdf_bytes_fail_the_task() {
        let session = Session::new(Config::default());
        let id = session
            .process_file("fake.pdf", MIME_PDF, b"plain text, not a pdf".to_vec())
            .unwrap();
        session.wait(&id).await;

        let record = session.record(&id).unwrap();
        assert_eq!(record.status, ProcessingStatus::Failed);
        assert_eq!(record.progress, 0);
        assert!(record.notes.is_none());
        let error = record.error.unwrap();
        assert!(error.contains("PDF extraction failed"));
    }

    #[tokio::test]
    async fn record_fields_track_the_upload() {
        let bytes = pdf_with_lines(&["Body text for the single page goes here."]);
        let size = bytes.len() as u64;
        let session = Session::new(Config::default());
        let id = session
            .process_file("doc.pdf", MIME_PDF, bytes)
            .unwrap();

        let record = session.record(&id).unwrap();
        assert_eq!(record.name, "doc.pdf");
        assert_eq!(record.size, size);
        assert_eq!(record.content_type, MIME_PDF);

        session.wait(&id).await;
    }

    #[tokio::test]
    async fn concurrent_files_get_independent_records() {
        let session = Session::new(Config::default());
        let a = session
            .process_file(
                "a.pdf",
                MIME_PDF,
                pdf_with_lines(&["First document body text sits on this line."]),
            )
            .unwrap();
        let b = session
            .process_file("b.pdf", MIME_PDF, b"broken".to_vec())
            .unwrap();
        session.wait(&a).await;
        session.wait(&b).await;

        let record_a = session.record(&a).unwrap();
        let record_b = session.record(&b).unwrap();
        assert_eq!(record_a.status, ProcessingStatus::Completed);
        assert_eq!(record_b.status, ProcessingStatus::Failed);
        assert_eq!(session.records().len(), 2);
    }

    #[tokio::test]
    async fn delete_and_clear_manage_history() {
        let session = Session::new(Config::default());
        let a = session
            .process_file("a.pdf", MIME_PDF, b"x".to_vec())
            .unwrap();
        let b = session
            .process_file("b.pdf", MIME_PDF, b"y".to_vec())
            .unwrap();
        session.wait(&a).await;
        session.wait(&b).await;

        assert!(session.delete(&a));
        assert!(!session.delete(&a));
        assert_eq!(session.records().len(), 1);

        session.clear();
        assert!(session.records().is_empty());
        assert!(session.record(&b).is_none());
    }
}
