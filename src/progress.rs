//! Pipeline progress reporting.
//!
//! The extraction task emits a bounded, ordered sequence of progress events
//! (percentage, stage label, optional current page) to one consumer. Progress
//! is emitted on **stderr** so stdout remains parseable for scripts.
//!
//! Checkpoints: 5% once the PDF structure is loaded, 5–85% proportionally per
//! page, then 85%/95%/100% for the post-processing stages.

use std::io::Write;

/// A single progress event for one file's processing task.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 0–100, monotonically non-decreasing for one task.
    pub percent: u8,
    /// Human-readable stage label, e.g. "Extracting content from page 3...".
    pub stage: String,
    /// Current page during the per-page extraction phase.
    pub page: Option<usize>,
}

/// Reports pipeline progress. Implementations write to stderr (human or JSON)
/// and must not panic — a reporter failure would otherwise abort the task.
pub trait ProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the extraction pipeline.
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "process  42%  Extracting content from page 3...".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = format!("process  {:>3}%  {}\n", event.percent, event.stage);
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = serde_json::json!({
            "event": "progress",
            "percent": event.percent,
            "stage": event.stage,
            "page": event.page,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_builds_matching_reporter() {
        // Smoke check that every mode yields a usable reporter.
        for mode in [ProgressMode::Off, ProgressMode::Human, ProgressMode::Json] {
            mode.reporter().report(ProgressEvent {
                percent: 50,
                stage: "stage".to_string(),
                page: Some(1),
            });
        }
    }
}
