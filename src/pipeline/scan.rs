//! Input discovery: validate the directories and list the PDFs to convert.
//!
//! Everything that can make the whole batch impossible is checked here,
//! before a single PDF is opened. Per-file problems are left to later stages.

use crate::error::Pdf2TxtError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// PDFs found in the input directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Candidate PDFs, sorted by file name.
    pub pdfs: Vec<PathBuf>,
    /// Entries that were not PDFs (other extensions, directories, non-UTF-8 names).
    pub ignored: usize,
}

/// `true` when the last dot-delimited segment of `file_name` is exactly `pdf`.
///
/// Case-sensitive: `A.PDF` is not picked up. A name without any dot never matches.
pub fn is_pdf_name(file_name: &str) -> bool {
    matches!(file_name.rsplit_once('.'), Some((_, ext)) if ext == "pdf")
}

/// List the PDFs directly inside `dir` (no recursion).
pub async fn scan_input_dir(dir: &Path) -> Result<ScanResult, Pdf2TxtError> {
    let meta = tokio::fs::metadata(dir).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Pdf2TxtError::InputNotFound {
            path: dir.to_path_buf(),
        },
        _ => Pdf2TxtError::InputUnreadable {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(Pdf2TxtError::InputNotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let unreadable = |e: std::io::Error| Pdf2TxtError::InputUnreadable {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;

    let mut result = ScanResult::default();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!("Ignoring entry with non UTF-8 name: {}", path.display());
            result.ignored += 1;
            continue;
        };

        if !is_pdf_name(name) {
            debug!("Ignoring {}", name);
            result.ignored += 1;
            continue;
        }

        // Follows symlinks. An entry whose metadata cannot be read is kept so
        // the failure shows up against that file instead of vanishing.
        match tokio::fs::metadata(&path).await {
            Ok(m) if !m.is_file() => {
                debug!("Ignoring non-file entry {}", name);
                result.ignored += 1;
            }
            _ => result.pdfs.push(path),
        }
    }

    result.pdfs.sort();
    debug!(
        "Scanned {}: {} PDFs, {} ignored",
        dir.display(),
        result.pdfs.len(),
        result.ignored
    );
    Ok(result)
}

/// The output directory must already exist; it is never created.
pub async fn check_output_dir(dir: &Path) -> Result<(), Pdf2TxtError> {
    match tokio::fs::metadata(dir).await {
        Ok(m) if m.is_dir() => Ok(()),
        _ => Err(Pdf2TxtError::OutputNotFound {
            path: dir.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_name_matching() {
        assert!(is_pdf_name("a.pdf"));
        assert!(is_pdf_name("report.final.pdf"));
        assert!(is_pdf_name(".pdf"));
        assert!(!is_pdf_name("A.PDF"));
        assert!(!is_pdf_name("a.Pdf"));
        assert!(!is_pdf_name("notes.txt"));
        assert!(!is_pdf_name("a.pdf.txt"));
        assert!(!is_pdf_name("pdf"));
        assert!(!is_pdf_name("a.pdfx"));
    }

    #[tokio::test]
    async fn scan_keeps_only_pdf_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.pdf", "a.pdf", "notes.txt", "UPPER.PDF", "b.pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/nested.pdf"), b"x").unwrap();

        let scan = scan_input_dir(dir.path()).await.unwrap();
        let names: Vec<_> = scan
            .pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        // notes.txt, UPPER.PDF, folder.pdf, sub
        assert_eq!(scan.ignored, 4);
    }

    #[tokio::test]
    async fn scan_missing_dir_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_input_dir(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, Pdf2TxtError::InputNotFound { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn scan_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"x").unwrap();
        let err = scan_input_dir(&file).await.unwrap_err();
        assert!(matches!(err, Pdf2TxtError::InputNotADirectory { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn output_dir_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_output_dir(dir.path()).await.is_ok());
        let err = check_output_dir(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, Pdf2TxtError::OutputNotFound { .. }));
        assert!(!dir.path().join("nope").exists());
    }
}
