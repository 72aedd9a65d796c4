//! Result types returned by a batch run.

use crate::error::{FileError, Pdf2TxtError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one PDF in the input directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// The PDF that was read.
    pub input: PathBuf,
    /// The text file written, if conversion succeeded.
    pub output: Option<PathBuf>,
    /// Character count of the extracted text (0 on failure).
    pub chars: usize,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
    /// Why the file failed; `None` on success.
    pub error: Option<FileError>,
    /// Set when `fail_fast` stopped the batch before this file was attempted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.skipped
    }
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// `*.pdf` files found in the input directory.
    pub discovered: usize,
    /// Directory entries that were not PDFs and were left alone.
    pub ignored: usize,
    /// Files handed to the extractor.
    pub attempted: usize,
    /// Files whose text output was written.
    pub succeeded: usize,
    /// Files that failed to read, parse or write.
    pub failed: usize,
    /// Files not attempted because `fail_fast` stopped the batch.
    pub skipped: usize,
    pub total_duration_ms: u64,
}

/// Full report of a batch run: one outcome per PDF, in processing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// `true` when every discovered PDF was converted.
    pub fn is_complete_success(&self) -> bool {
        self.stats.failed == 0 && self.stats.skipped == 0
    }

    /// Outcomes of the files that failed.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.error.is_some())
    }

    /// Treat any failed or skipped file as an error.
    pub fn into_result(self) -> Result<BatchReport, Pdf2TxtError> {
        if self.is_complete_success() {
            Ok(self)
        } else {
            Err(Pdf2TxtError::PartialFailure {
                success: self.stats.succeeded,
                failed: self.stats.failed + self.stats.skipped,
                total: self.stats.discovered,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, error: Option<FileError>) -> FileOutcome {
        FileOutcome {
            input: PathBuf::from(name),
            output: error.is_none().then(|| PathBuf::from(format!("out/{name}.txt"))),
            chars: 5,
            duration_ms: 1,
            error,
            skipped: false,
        }
    }

    #[test]
    fn into_result_ok_when_all_succeeded() {
        let report = BatchReport {
            files: vec![outcome("a.pdf", None)],
            stats: BatchStats {
                discovered: 1,
                attempted: 1,
                succeeded: 1,
                ..Default::default()
            },
        };
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn into_result_reports_partial_failure() {
        let err = FileError::Parse {
            path: PathBuf::from("b.pdf"),
            detail: "bad".into(),
        };
        let report = BatchReport {
            files: vec![outcome("a.pdf", None), outcome("b.pdf", Some(err))],
            stats: BatchStats {
                discovered: 2,
                attempted: 2,
                succeeded: 1,
                failed: 1,
                ..Default::default()
            },
        };
        assert_eq!(report.failures().count(), 1);
        match report.into_result() {
            Err(Pdf2TxtError::PartialFailure {
                success,
                failed,
                total,
            }) => assert_eq!((success, failed, total), (1, 1, 2)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn skipped_flag_omitted_from_json_when_false() {
        let json = serde_json::to_string(&outcome("a.pdf", None)).unwrap();
        assert!(!json.contains("skipped"), "got: {json}");
    }
}
