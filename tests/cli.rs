//! Exit-code and output checks for the `pdf2txt` binary.
//!
//! Only paths that fail or finish before the PDF engine is needed are covered
//! here, so these run without PDFium or network access.

#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::Command;

struct Dirs {
    _root: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn dirs() -> Dirs {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("pdfs");
    let output = root.path().join("text");
    std::fs::create_dir(&input).unwrap();
    std::fs::create_dir(&output).unwrap();
    Dirs {
        _root: root,
        input,
        output,
    }
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

fn pdf2txt_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pdf2txt"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_missing_input_dir_exits_2() {
    let d = dirs();
    let status = pdf2txt_bin()
        .args(["convert", "--no-progress", "--input"])
        .arg(d.input.join("nope"))
        .arg("--output")
        .arg(&d.output)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    assert_eq!(entries(&d.output), 0);
}

#[test]
fn test_cli_missing_output_dir_is_not_created() {
    let d = dirs();
    let missing = d.output.join("nope");
    let status = pdf2txt_bin()
        .args(["convert", "--no-progress", "--input"])
        .arg(&d.input)
        .arg("--output")
        .arg(&missing)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    assert!(!missing.exists());
}

#[test]
fn test_cli_empty_input_dir_succeeds_with_report() {
    let d = dirs();
    std::fs::write(d.input.join("readme.md"), "# nothing").unwrap();

    let out = pdf2txt_bin()
        .args(["convert", "--json", "--input"])
        .arg(&d.input)
        .arg("--output")
        .arg(&d.output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["stats"]["discovered"], 0);
    assert_eq!(report["stats"]["ignored"], 1);
    assert_eq!(entries(&d.output), 0);
}

#[test]
fn test_cli_rejects_pdf_suffix() {
    let d = dirs();
    let status = pdf2txt_bin()
        .args(["convert", "--suffix", ".pdf", "--input"])
        .arg(&d.input)
        .arg("--output")
        .arg(&d.output)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
}

#[test]
fn test_cli_failed_file_exits_1() {
    if pdfium_auto::cached_pdfium_path().is_none() {
        println!("SKIP — PDFium not cached; set PDFIUM_LIB_PATH to run this test");
        return;
    }
    let d = dirs();
    std::fs::write(d.input.join("broken.pdf"), b"%PDF-1.4\nnot really a pdf").unwrap();

    let out = pdf2txt_bin()
        .args(["convert", "--json", "--input"])
        .arg(&d.input)
        .arg("--output")
        .arg(&d.output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["stats"]["failed"], 1);
    assert_eq!(report["files"][0]["error"]["kind"], "parse");
    assert_eq!(entries(&d.output), 0);
}
