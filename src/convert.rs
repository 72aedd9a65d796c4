//! Batch conversion entry points.
//!
//! [`convert_all`] walks the input directory once and converts every PDF in
//! file-name order, one file at a time. Each file is its own failure domain:
//! a PDF that cannot be read, parsed or written is recorded in the
//! [`BatchReport`] and the loop moves on. Set
//! [`crate::config::BatchConfig::fail_fast`] to stop at the first failure
//! instead.

use crate::config::{BatchConfig, PageBreak, PageSelection};
use crate::error::{FileError, Pdf2TxtError};
use crate::output::{BatchReport, BatchStats, FileOutcome};
use crate::pipeline::extract::{self, PdfiumExtractor, TextExtractor};
use crate::pipeline::{scan, write};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every PDF in `config.input_dir` to a text file in `config.output_dir`.
///
/// # Returns
/// `Ok(BatchReport)` once every PDF was attempted, even if some failed
/// (check `report.stats.failed`, or call [`BatchReport::into_result`]).
///
/// # Errors
/// Returns `Err(Pdf2TxtError)` only when the batch cannot run at all:
/// - input directory missing, not a directory, or unreadable
/// - output directory missing
/// - no PDF engine could be bound
pub async fn convert_all(config: &BatchConfig) -> Result<BatchReport, Pdf2TxtError> {
    let total_start = Instant::now();
    let input_dir = config.effective_input_dir();
    info!(
        "Starting batch: {} → {}",
        input_dir.display(),
        config.output_dir.display()
    );

    // ── Step 1: Validate directories and discover PDFs ───────────────────
    let scan = scan::scan_input_dir(&input_dir).await?;
    scan::check_output_dir(&config.output_dir).await?;
    let total = scan.pdfs.len();
    info!("Found {} PDFs ({} other entries ignored)", total, scan.ignored);

    let mut stats = BatchStats {
        discovered: total,
        ignored: scan.ignored,
        ..Default::default()
    };

    let progress: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));

    if total == 0 {
        progress.on_batch_complete(0, 0);
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        return Ok(BatchReport {
            files: Vec::new(),
            stats,
        });
    }

    // ── Step 2: Get/create the extractor ─────────────────────────────────
    let extractor = resolve_extractor(config).await?;

    progress.on_batch_start(total);

    // ── Step 3: Convert one file at a time ───────────────────────────────
    let mut files = Vec::with_capacity(total);
    let mut stopped = false;

    for (i, pdf) in scan.pdfs.iter().enumerate() {
        let index = i + 1;

        if stopped {
            files.push(FileOutcome {
                input: pdf.clone(),
                output: None,
                chars: 0,
                duration_ms: 0,
                error: None,
                skipped: true,
            });
            stats.skipped += 1;
            continue;
        }

        progress.on_file_start(index, total, pdf);

        let file_start = Instant::now();
        let output_path = target_path(config, pdf);
        let result = convert_file(&extractor, pdf, &output_path, config).await;
        let duration_ms = file_start.elapsed().as_millis() as u64;
        stats.attempted += 1;

        let outcome = match result {
            Ok(chars) => {
                debug!("{} → {} ({} chars)", pdf.display(), output_path.display(), chars);
                progress.on_file_complete(index, total, pdf, chars);
                stats.succeeded += 1;
                FileOutcome {
                    input: pdf.clone(),
                    output: Some(output_path),
                    chars,
                    duration_ms,
                    error: None,
                    skipped: false,
                }
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", pdf.display(), e);
                progress.on_file_error(index, total, pdf, &e.to_string());
                stats.failed += 1;
                if config.fail_fast {
                    warn!("fail-fast: skipping the remaining {} files", total - index);
                    stopped = true;
                }
                FileOutcome {
                    input: pdf.clone(),
                    output: None,
                    chars: 0,
                    duration_ms,
                    error: Some(e),
                    skipped: false,
                }
            }
        };
        files.push(outcome);
    }

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} converted, {} failed, {} skipped, {}ms",
        stats.succeeded, stats.attempted, stats.failed, stats.skipped, stats.total_duration_ms
    );

    progress.on_batch_complete(stats.attempted, stats.succeeded);

    Ok(BatchReport { files, stats })
}

/// Synchronous wrapper around [`convert_all`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_all_sync(config: &BatchConfig) -> Result<BatchReport, Pdf2TxtError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2TxtError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_all(config))
}

/// Extract the text of a single PDF without writing anything.
///
/// With `extractor = None`, PDFium is located the same way [`convert_all`]
/// does it. Any per-file failure becomes [`Pdf2TxtError::File`].
pub async fn extract_file(
    path: impl AsRef<Path>,
    pages: &PageSelection,
    page_break: &PageBreak,
    extractor: Option<Arc<dyn TextExtractor>>,
) -> Result<String, Pdf2TxtError> {
    let path = path.as_ref().to_path_buf();
    let extractor = match extractor {
        Some(e) => e,
        None => default_extractor().await?,
    };
    let pages = pages.clone();
    let page_break = page_break.clone();

    let task_path = path.clone();
    let text = tokio::task::spawn_blocking(move || {
        extract::extract_text(extractor.as_ref(), &task_path, &pages, &page_break)
    })
    .await
    .map_err(|e| Pdf2TxtError::Internal(format!("Extraction task panicked: {}", e)))??;

    info!("Extracted {} chars from {}", text.chars().count(), path.display());
    Ok(text)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// `<output_dir>/<pdf file name><suffix>`.
fn target_path(config: &BatchConfig, pdf: &Path) -> PathBuf {
    let name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    config.output_path_for(&name)
}

/// Extract one PDF and place its text file. Returns the character count.
///
/// Runs in `spawn_blocking`: both the engine and the file I/O block. A panic
/// inside the engine is reported against this file only.
async fn convert_file(
    extractor: &Arc<dyn TextExtractor>,
    pdf: &Path,
    output_path: &Path,
    config: &BatchConfig,
) -> Result<usize, FileError> {
    let extractor = Arc::clone(extractor);
    let pdf_owned = pdf.to_path_buf();
    let out = output_path.to_path_buf();
    let pages = config.pages.clone();
    let page_break = config.page_break.clone();

    tokio::task::spawn_blocking(move || {
        let text = extract::extract_text(extractor.as_ref(), &pdf_owned, &pages, &page_break)?;
        write::write_atomic(&out, &text)?;
        Ok(text.chars().count())
    })
    .await
    .map_err(|e| FileError::Parse {
        path: pdf.to_path_buf(),
        detail: format!("extraction task panicked: {}", e),
    })?
}

/// Resolve the extractor, from most-specific to least-specific.
///
/// 1. **Pre-built extractor** (`config.extractor`), used as-is.
/// 2. **PDFium** located through `pdfium-auto`: `PDFIUM_LIB_PATH`, the local
///    cache, or a one-time download.
async fn resolve_extractor(config: &BatchConfig) -> Result<Arc<dyn TextExtractor>, Pdf2TxtError> {
    if let Some(ref extractor) = config.extractor {
        return Ok(Arc::clone(extractor));
    }
    default_extractor().await
}

async fn default_extractor() -> Result<Arc<dyn TextExtractor>, Pdf2TxtError> {
    let extractor = tokio::task::spawn_blocking(PdfiumExtractor::from_env)
        .await
        .map_err(|e| Pdf2TxtError::Internal(format!("pdfium setup task panicked: {}", e)))??;
    debug!("Using pdfium at {}", extractor.library_path().display());
    Ok(Arc::new(extractor))
}
