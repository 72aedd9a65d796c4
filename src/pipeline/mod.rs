//! Pipeline stages for batch PDF-to-text conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the PDF engine can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ extract ──▶ write
//! (dir)    (pdfium)    (temp + rename)
//! ```
//!
//! 1. [`scan`]    — validate input/output directories and list `*.pdf` entries
//! 2. [`extract`] — per-page text through a [`extract::TextExtractor`]
//! 3. [`write`]   — atomic placement of the text file in the output directory

pub mod extract;
pub mod scan;
pub mod write;
