//! Configuration types for batch PDF-to-text conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Directories are plain runtime values: nothing about
//! where PDFs live or where text lands is compiled into the binary.

use crate::error::Pdf2TxtError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::scan::is_pdf_name;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix appended to the original PDF file name when none is configured.
pub const DEFAULT_SUFFIX: &str = ".txt";

/// Configuration for one batch run.
///
/// # Example
/// ```rust
/// use pdf2txt::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .input_dir("pdfs")
///     .output_dir("text")
///     .suffix(".txt")
///     .build()
///     .unwrap();
/// assert_eq!(config.output_path_for("report.pdf"), std::path::Path::new("text/report.pdf.txt"));
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned (non-recursively) for `*.pdf` files.
    /// An empty path means the current working directory.
    pub input_dir: PathBuf,

    /// Directory receiving one text file per converted PDF. Must already exist.
    pub output_dir: PathBuf,

    /// Appended to the PDF's file name to form the output name. Default: `.txt`.
    ///
    /// `.doc` reproduces the naming of older runs for consumers that still
    /// expect it; the content is plain text either way.
    pub suffix: String,

    /// Pages extracted from every PDF. Default: all pages.
    pub pages: PageSelection,

    /// String written after each page's text. Default: form feed.
    pub page_break: PageBreak,

    /// Stop at the first failing file instead of isolating it. Default: false.
    pub fail_fast: bool,

    /// Pre-constructed text extractor. When `None`, PDFium is located (or
    /// downloaded) through `pdfium-auto`.
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
            pages: PageSelection::default(),
            page_break: PageBreak::default(),
            fail_fast: false,
            extractor: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("suffix", &self.suffix)
            .field("pages", &self.pages)
            .field("page_break", &self.page_break)
            .field("fail_fast", &self.fail_fast)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// The directory actually scanned: `input_dir`, or `.` when it is empty.
    pub fn effective_input_dir(&self) -> PathBuf {
        if self.input_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            self.input_dir.clone()
        }
    }

    /// Final location of the text extracted from the PDF named `file_name`.
    pub fn output_path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", file_name, self.suffix))
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.input_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.suffix = suffix.into();
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_break(mut self, page_break: PageBreak) -> Self {
        self.config.page_break = page_break;
        self
    }

    pub fn fail_fast(mut self, v: bool) -> Self {
        self.config.fail_fast = v;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Pdf2TxtError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(Pdf2TxtError::InvalidConfig(
                "An output directory is required".into(),
            ));
        }
        validate_suffix(&c.suffix)?;
        Ok(self.config)
    }
}

/// A suffix must look like `.ext` so the output stays a sibling file name.
fn validate_suffix(suffix: &str) -> Result<(), Pdf2TxtError> {
    if !suffix.starts_with('.') || suffix.len() < 2 {
        return Err(Pdf2TxtError::InvalidConfig(format!(
            "Output suffix must start with '.' and name an extension, got {suffix:?}"
        )));
    }
    if suffix.contains('/') || suffix.contains('\\') {
        return Err(Pdf2TxtError::InvalidConfig(format!(
            "Output suffix must not contain a path separator, got {suffix:?}"
        )));
    }
    if is_pdf_name(suffix) {
        // outputs would be picked up as input by the next run
        return Err(Pdf2TxtError::InvalidConfig(format!(
            "Output suffix must not end in '.pdf', got {suffix:?}"
        )));
    }
    Ok(())
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of each PDF to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// Extract a single page (1-indexed).
    Single(usize),
    /// Extract a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Extract specific pages (1-indexed, deduplicated). Empty means all pages.
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Set(pages) if pages.is_empty() => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// What follows each page's text in the assembled output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageBreak {
    /// Form feed `\x0c`, as pdftotext and pdfminer emit. (default)
    #[default]
    FormFeed,
    /// A single newline.
    Newline,
    /// Nothing: pages run together.
    None,
    /// Custom string appended after every page.
    Custom(String),
}

impl PageBreak {
    /// The literal text appended after a page.
    pub fn as_str(&self) -> &str {
        match self {
            PageBreak::FormFeed => "\x0c",
            PageBreak::Newline => "\n",
            PageBreak::None => "",
            PageBreak::Custom(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(4, 10).to_indices(5), vec![3, 4]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }

    #[test]
    fn empty_set_means_every_page() {
        assert_eq!(
            PageSelection::Set(vec![]).to_indices(3),
            PageSelection::All.to_indices(3)
        );
    }

    #[test]
    fn full_set_equals_all() {
        assert_eq!(
            PageSelection::Set(vec![1, 2, 3, 4]).to_indices(4),
            PageSelection::All.to_indices(4)
        );
    }

    #[test]
    fn page_break_literals() {
        assert_eq!(PageBreak::default().as_str(), "\x0c");
        assert_eq!(PageBreak::Newline.as_str(), "\n");
        assert_eq!(PageBreak::None.as_str(), "");
        assert_eq!(PageBreak::Custom("\n---\n".into()).as_str(), "\n---\n");
    }

    #[test]
    fn builder_requires_output_dir() {
        let err = BatchConfig::builder().input_dir("in").build().unwrap_err();
        assert!(matches!(err, Pdf2TxtError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_bad_suffixes() {
        for bad in ["txt", ".", "", "./x", ".a\\b", ".pdf", ".bak.pdf"] {
            let res = BatchConfig::builder().output_dir("out").suffix(bad).build();
            assert!(res.is_err(), "suffix {bad:?} should be rejected");
        }
    }

    #[test]
    fn suffix_may_mention_pdf_before_its_extension() {
        let config = BatchConfig::builder()
            .output_dir("out")
            .suffix(".pdf.txt")
            .build()
            .unwrap();
        assert!(!is_pdf_name(
            config.output_path_for("a.pdf").to_str().unwrap()
        ));
    }

    #[test]
    fn doc_suffix_is_opt_in() {
        let config = BatchConfig::builder().output_dir("out").build().unwrap();
        assert_eq!(config.suffix, ".txt");
        assert_eq!(config.output_path_for("a.pdf"), PathBuf::from("out/a.pdf.txt"));

        let legacy = BatchConfig::builder()
            .output_dir("out")
            .suffix(".doc")
            .build()
            .unwrap();
        assert_eq!(legacy.output_path_for("a.pdf"), PathBuf::from("out/a.pdf.doc"));
    }

    #[test]
    fn empty_input_dir_means_current_directory() {
        let config = BatchConfig::builder().output_dir("out").build().unwrap();
        assert_eq!(config.effective_input_dir(), PathBuf::from("."));

        let config = BatchConfig::builder()
            .input_dir("pdfs")
            .output_dir("out")
            .build()
            .unwrap();
        assert_eq!(config.effective_input_dir(), PathBuf::from("pdfs"));
    }
}
