//! # pdf2txt
//!
//! Batch-convert a directory of PDF documents to plain-text files.
//!
//! Text extraction is delegated to PDFium (through `pdfium-render`); this
//! crate owns everything around it: finding the PDFs, isolating failures per
//! file, placing outputs atomically, and reporting what happened.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Scan     validate directories, list *.pdf (case-sensitive, non-recursive)
//!  ├─ 2. Extract  per-page text via pdfium, joined with a page break
//!  ├─ 3. Write    temp file in the output dir, atomic rename to <name>.pdf.txt
//!  └─ 4. Report   per-file outcome + attempted/succeeded/failed counts
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2txt::{convert_all, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .input_dir("pdfs")
//!         .output_dir("text")
//!         .build()?;
//!     let report = convert_all(&config).await?;
//!     eprintln!(
//!         "{} converted, {} failed",
//!         report.stats.succeeded, report.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2txt = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder, PageBreak, PageSelection, DEFAULT_SUFFIX};
pub use convert::{convert_all, convert_all_sync, extract_file};
pub use error::{FileError, Pdf2TxtError};
pub use output::{BatchReport, BatchStats, FileOutcome};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
