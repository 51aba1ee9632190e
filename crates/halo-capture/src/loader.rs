use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use halo_core::model::GenerationStep;

use crate::error::CaptureError;
use crate::format::{detect_format, list_records, CaptureFormat, RecordRef};

/// Entry point for reading the steps of one capture directory.
#[derive(Debug, Clone)]
pub struct StepLoader {
    capture_dir: PathBuf,
    format: CaptureFormat,
}

impl StepLoader {
    /// Open a capture directory and detect its record format.
    pub fn open(capture_dir: &Path) -> Result<Self, CaptureError> {
        if !capture_dir.is_dir() {
            return Err(CaptureError::CaptureNotFound(capture_dir.to_path_buf()));
        }
        let format = detect_format(capture_dir)?;
        debug!(dir = %capture_dir.display(), %format, "detected capture format");
        Ok(Self {
            capture_dir: capture_dir.to_path_buf(),
            format,
        })
    }

    pub fn capture_dir(&self) -> &Path {
        &self.capture_dir
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    /// Current record listing, rescanned on every call.
    pub fn records(&self) -> Result<Vec<RecordRef>, CaptureError> {
        list_records(&self.capture_dir, self.format)
    }

    /// A fresh pass over the capture's steps in ascending index order.
    ///
    /// The directory is listed now; each record is read only when the
    /// iterator reaches it. Malformed records are logged and skipped.
    pub fn steps(&self) -> Result<Steps, CaptureError> {
        let records = self.records()?;
        Ok(Steps {
            summary: LoadSummary {
                records: records.len(),
                ..LoadSummary::new(self.format)
            },
            records: records.into_iter(),
            last_context_length: None,
        })
    }
}

/// Counters for one pass over a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub format: CaptureFormat,
    /// Record files found.
    pub records: usize,
    /// Records yielded with an attention payload.
    pub loaded: usize,
    /// Records yielded without attention.
    pub inert: usize,
    /// Malformed records dropped.
    pub skipped: usize,
}

impl LoadSummary {
    pub fn new(format: CaptureFormat) -> Self {
        Self {
            format,
            records: 0,
            loaded: 0,
            inert: 0,
            skipped: 0,
        }
    }
}

/// Lazy iterator over one pass of step records.
#[derive(Debug)]
pub struct Steps {
    records: std::vec::IntoIter<RecordRef>,
    summary: LoadSummary,
    last_context_length: Option<usize>,
}

impl Steps {
    /// Counters so far; final once the iterator is exhausted.
    pub fn summary(&self) -> LoadSummary {
        self.summary
    }
}

impl Iterator for Steps {
    type Item = GenerationStep;

    fn next(&mut self) -> Option<GenerationStep> {
        loop {
            let record = self.records.next()?;
            match record.read() {
                Ok(step) => {
                    match &step.attention {
                        Some(attention) => {
                            self.summary.loaded += 1;
                            let context = attention.context_length();
                            if let Some(prev) = self.last_context_length {
                                if context < prev {
                                    debug!(
                                        record = %record.file_name(),
                                        prev,
                                        context,
                                        "context length shrank between steps"
                                    );
                                }
                            }
                            self.last_context_length = Some(context);
                        }
                        None => self.summary.inert += 1,
                    }
                    return Some(step);
                }
                Err(e) => {
                    warn!(record = %record.file_name(), error = %e, "skipping malformed record");
                    self.summary.skipped += 1;
                }
            }
        }
    }
}
