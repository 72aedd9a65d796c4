//! Text extraction: turn one PDF into the text of its selected pages.
//!
//! The engine sits behind [`TextExtractor`] so the batch loop never depends
//! on PDFium directly. [`PdfiumExtractor`] is the production implementation.
//!
//! ## Why a dedicated engine thread?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which keeps global
//! state and should be bound once per process. The bound [`Pdfium`] instance
//! therefore lives on a single long-running thread that serves extraction
//! requests over a channel; callers only exchange owned bytes and strings
//! with it. Documents are still loaded and released per request.

use crate::config::{PageBreak, PageSelection};
use crate::error::{FileError, Pdf2TxtError};
use pdfium_render::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// A PDF text engine.
///
/// Implementations must be callable from any thread; the batch converter
/// invokes them inside `spawn_blocking`.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of the selected pages of `path`, one string per page,
    /// in document order.
    fn extract_pages(&self, path: &Path, pages: &PageSelection) -> Result<Vec<String>, FileError>;
}

/// Extract `path` and join its pages with `page_break`.
pub fn extract_text(
    extractor: &dyn TextExtractor,
    path: &Path,
    pages: &PageSelection,
    page_break: &PageBreak,
) -> Result<String, FileError> {
    let page_texts = extractor.extract_pages(path, pages)?;
    debug!("Extracted {} pages from {}", page_texts.len(), path.display());
    Ok(assemble_pages(&page_texts, page_break))
}

/// Concatenate page texts in order, each followed by the page break.
pub fn assemble_pages(pages: &[String], page_break: &PageBreak) -> String {
    let sep = page_break.as_str();
    let capacity = pages.iter().map(|p| p.len() + sep.len()).sum();
    let mut text = String::with_capacity(capacity);
    for page in pages {
        text.push_str(page);
        text.push_str(sep);
    }
    text
}

/// Read a PDF from disk, rejecting anything without the `%PDF` magic.
pub fn read_pdf_bytes(path: &Path) -> Result<Vec<u8>, FileError> {
    let bytes = std::fs::read(path).map_err(|e| FileError::FileRead {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let magic: Vec<u8> = bytes.iter().take(4).copied().collect();
        return Err(FileError::Parse {
            path: path.to_path_buf(),
            detail: format!("not a PDF (first bytes: {:?})", magic),
        });
    }

    Ok(bytes)
}

// ── PDFium backend ───────────────────────────────────────────────────────

/// PDFium-based implementation of [`TextExtractor`].
#[derive(Debug, Clone)]
pub struct PdfiumExtractor {
    library_path: PathBuf,
}

impl PdfiumExtractor {
    /// Bind the pdfium library at `library_path`.
    ///
    /// The library is bound once per process; later calls reuse the first
    /// binding regardless of the path they pass.
    pub fn new(library_path: impl Into<PathBuf>) -> Result<Self, Pdf2TxtError> {
        let library_path = library_path.into();
        engine(&library_path)?;
        Ok(Self { library_path })
    }

    /// Locate pdfium (`PDFIUM_LIB_PATH`, the local cache, or a download) and bind it.
    ///
    /// Blocks while downloading on first use.
    pub fn from_env() -> Result<Self, Pdf2TxtError> {
        let path = pdfium_auto::ensure_pdfium_library(None)
            .map_err(|e| Pdf2TxtError::PdfiumBindingFailed(e.to_string()))?;
        Self::new(path)
    }

    /// Bind pdfium only if it is already available locally; never downloads.
    pub fn cached() -> Option<Self> {
        pdfium_auto::cached_pdfium_path().and_then(|p| Self::new(p).ok())
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }
}

impl TextExtractor for PdfiumExtractor {
    fn extract_pages(&self, path: &Path, pages: &PageSelection) -> Result<Vec<String>, FileError> {
        let bytes = read_pdf_bytes(path)?;

        let engine = engine(&self.library_path).map_err(|e| FileError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let (reply_tx, reply_rx) = mpsc::channel();
        let request = ExtractRequest {
            path: path.to_path_buf(),
            bytes,
            pages: pages.clone(),
            reply: reply_tx,
        };

        let engine_gone = || FileError::Parse {
            path: path.to_path_buf(),
            detail: "pdfium engine thread stopped".to_string(),
        };
        engine.requests.send(request).map_err(|_| engine_gone())?;
        reply_rx.recv().map_err(|_| engine_gone())?
    }
}

struct ExtractRequest {
    path: PathBuf,
    bytes: Vec<u8>,
    pages: PageSelection,
    reply: mpsc::Sender<Result<Vec<String>, FileError>>,
}

/// Handle to the thread that owns the bound pdfium library.
struct Engine {
    requests: mpsc::Sender<ExtractRequest>,
}

static ENGINE: OnceLock<Result<Engine, String>> = OnceLock::new();

fn engine(library_path: &Path) -> Result<&'static Engine, Pdf2TxtError> {
    ENGINE
        .get_or_init(|| Engine::spawn(library_path))
        .as_ref()
        .map_err(|e| Pdf2TxtError::PdfiumBindingFailed(e.clone()))
}

impl Engine {
    fn spawn(library_path: &Path) -> Result<Self, String> {
        let (request_tx, request_rx) = mpsc::channel::<ExtractRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let path = library_path.to_path_buf();

        std::thread::Builder::new()
            .name("pdfium".to_string())
            .spawn(move || {
                let pdfium = match pdfium_auto::bind_pdfium_from_path(&path) {
                    Ok(pdfium) => pdfium,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                info!("pdfium bound from {}", path.display());

                serve_requests(request_rx, |path, bytes, pages| {
                    extract_with(&pdfium, path, bytes, pages)
                });
            })
            .map_err(|e| format!("cannot start pdfium thread: {e}"))?;

        ready_rx
            .recv()
            .map_err(|_| "pdfium thread exited during startup".to_string())??;

        Ok(Self {
            requests: request_tx,
        })
    }
}

/// Answer requests until every sender is gone. A panic while handling one
/// document is reported as a `Parse` error for that document and the loop
/// keeps serving.
fn serve_requests<F>(requests: mpsc::Receiver<ExtractRequest>, mut extract: F)
where
    F: FnMut(&Path, Vec<u8>, &PageSelection) -> Result<Vec<String>, FileError>,
{
    for request in requests {
        let ExtractRequest {
            path,
            bytes,
            pages,
            reply,
        } = request;
        let result = panic::catch_unwind(AssertUnwindSafe(|| extract(&path, bytes, &pages)))
            .unwrap_or_else(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!("pdfium panicked on {}: {}", path.display(), reason);
                Err(FileError::Parse {
                    path: path.clone(),
                    detail: format!("pdfium panicked: {reason}"),
                })
            });
        let _ = reply.send(result);
    }
}

/// Load one document and collect the text of its selected pages.
fn extract_with(
    pdfium: &Pdfium,
    path: &Path,
    bytes: Vec<u8>,
    selection: &PageSelection,
) -> Result<Vec<String>, FileError> {
    let document = pdfium.load_pdf_from_byte_vec(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        let detail = if err_str.contains("Password") || err_str.contains("password") {
            "PDF is encrypted and requires a password".to_string()
        } else {
            err_str
        };
        FileError::Parse {
            path: path.to_path_buf(),
            detail,
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let wanted = selection.to_indices(total_pages);
    debug!(
        "{}: {} pages, {} selected",
        path.display(),
        total_pages,
        wanted.len()
    );

    let mut texts = Vec::with_capacity(wanted.len());
    for (idx, page) in pages.iter().enumerate() {
        if wanted.binary_search(&idx).is_err() {
            continue;
        }
        let text = page.text().map_err(|e| FileError::Parse {
            path: path.to_path_buf(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        texts.push(text.all());
    }

    Ok(texts)
}
