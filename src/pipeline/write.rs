//! Output placement: write text next to its final name, then rename.
//!
//! The text goes to a temporary file created inside the output directory and
//! is renamed over the final path in one step, so a reader of the output
//! directory sees either the previous file or the complete new one, never a
//! half-written file. Same-directory renames keep the move atomic.

use crate::error::FileError;
use std::io::Write;
use std::path::Path;

/// Atomically create or replace `final_path` with `text`.
pub fn write_atomic(final_path: &Path, text: &str) -> Result<(), FileError> {
    let write_err = |detail: String| FileError::OutputWrite {
        path: final_path.to_path_buf(),
        detail,
    };

    let dir = match final_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Dropping `tmp` on any error below removes the temporary file.
    let mut tmp = tempfile::Builder::new()
        .prefix(".pdf2txt-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| write_err(format!("cannot create temporary file: {e}")))?;

    tmp.write_all(text.as_bytes())
        .map_err(|e| write_err(e.to_string()))?;
    tmp.flush().map_err(|e| write_err(e.to_string()))?;

    tmp.persist(final_path)
        .map_err(|e| write_err(format!("cannot move into place: {}", e.error)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.pdf.txt");
        write_atomic(&out, "Hello\x0c").unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "Hello\x0c");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.pdf.txt");
        write_atomic(&out, "first run, longer text").unwrap();
        write_atomic(&out, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "second");
    }

    #[test]
    fn empty_text_still_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("blank.pdf.txt");
        write_atomic(&out, "").unwrap();
        assert!(out.exists());
        assert_eq!(std::fs::metadata(&out).unwrap().len(), 0);
    }

    #[test]
    fn missing_directory_is_output_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("a.pdf.txt");
        let err = write_atomic(&out, "x").unwrap_err();
        assert!(matches!(err, FileError::OutputWrite { .. }), "got: {err:?}");
        assert!(!dir.path().join("missing").exists());
    }
}
