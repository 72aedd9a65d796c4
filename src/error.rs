//! Error types for the pdf2txt library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2TxtError`] — **Fatal**: the batch cannot start at all (input
//!   directory missing, bad configuration, PDF engine unavailable). Returned
//!   as `Err(Pdf2TxtError)` from the top-level `convert*` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single PDF could not be read, parsed or
//!   written, but every other file in the directory is unaffected. Stored
//!   inside [`crate::output::FileOutcome`] so one bad document never costs the
//!   rest of the batch.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2txt library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2TxtError {
    // ── Directory errors ──────────────────────────────────────────────────
    /// The input directory does not exist.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The input path exists but is a file, not a directory.
    #[error("Input path is not a directory: '{path}'")]
    InputNotADirectory { path: PathBuf },

    /// The input directory exists but cannot be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory does not exist (it is never created implicitly).
    #[error("Output directory not found: '{path}'\nCreate it first: mkdir -p {path:?}")]
    OutputNotFound { path: PathBuf },

    // ── Batch outcome ─────────────────────────────────────────────────────
    /// Some files succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::BatchReport::into_result`] when the
    /// caller wants to treat any file failure as an error.
    #[error("{failed}/{total} files failed during conversion")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    /// Single-file extraction failed (see [`crate::convert::extract_file`]).
    #[error(transparent)]
    File(#[from] FileError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input file.
///
/// The batch records it against the file and moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    /// The PDF could not be opened or read from disk.
    #[error("{path}: cannot read file: {detail}")]
    FileRead { path: PathBuf, detail: String },

    /// The PDF engine could not interpret the document (not a PDF, corrupt,
    /// encrypted, or a page without a usable text layer).
    #[error("{path}: cannot parse PDF: {detail}")]
    Parse { path: PathBuf, detail: String },

    /// The text file could not be created, written or moved into place.
    #[error("{path}: cannot write output: {detail}")]
    OutputWrite { path: PathBuf, detail: String },
}

impl FileError {
    /// Short machine-friendly label, used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            FileError::FileRead { .. } => "file_read",
            FileError::Parse { .. } => "parse",
            FileError::OutputWrite { .. } => "output_write",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = Pdf2TxtError::PartialFailure {
            success: 2,
            failed: 1,
            total: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/3"), "got: {msg}");
    }

    #[test]
    fn input_not_found_mentions_path() {
        let e = Pdf2TxtError::InputNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert!(e.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn parse_error_display() {
        let e = FileError::Parse {
            path: PathBuf::from("b.pdf"),
            detail: "bad header".into(),
        };
        assert_eq!(e.to_string(), "b.pdf: cannot parse PDF: bad header");
        assert_eq!(e.kind(), "parse");
    }

    #[test]
    fn file_error_serialises_with_kind_tag() {
        let e = FileError::OutputWrite {
            path: PathBuf::from("out/a.pdf.txt"),
            detail: "disk full".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "output_write");
        assert_eq!(json["detail"], "disk full");
    }
}
