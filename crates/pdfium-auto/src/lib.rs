//! # pdfium-auto
//!
//! Finds the [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! for `pdfium-render`, downloading it once into a per-user cache when it is
//! not already present.
//!
//! ## Resolution order
//!
//! 1. `PDFIUM_LIB_PATH`: an explicit library path. It must exist.
//! 2. `<cache>/pdfium-{VERSION}/<lib>`: a previous download.
//! 3. Download the platform archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    extract the library next to its final name and rename it into place.
//!
//! The cache root is `PDFIUM_AUTO_CACHE_DIR` when set, otherwise the
//! platform cache directory joined with `pdf2txt`.
//!
//! ```rust,no_run
//! use pdfium_auto::{bind_pdfium_from_path, ensure_pdfium_library};
//!
//! let path = ensure_pdfium_library(Some(&|done, total| {
//!     if let Some(t) = total {
//!         eprint!("\rpdfium: {done}/{t} bytes");
//!     }
//! }))?;
//! let pdfium = bind_pdfium_from_path(&path)?;
//! # Ok::<(), pdfium_auto::PdfiumAutoError>(())
//! ```

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Explicit library path override.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Cache root override.
pub const CACHE_DIR_ENV: &str = "PDFIUM_AUTO_CACHE_DIR";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Application directory under the platform cache root.
const CACHE_APP_DIR: &str = "pdf2txt";

/// Download read granularity; progress is reported once per chunk.
const CHUNK_SIZE: usize = 64 * 1024;

/// Progress sink for the download: `(bytes_so_far, content_length)`.
pub type DownloadProgress<'a> = &'a dyn Fn(u64, Option<u64>);

#[derive(Error, Debug)]
pub enum PdfiumAutoError {
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("PDFIUM_LIB_PATH points to '{}', which does not exist", path.display())]
    MissingOverride { path: PathBuf },

    #[error("Cache directory '{}': {source}", path.display())]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from '{}': {reason}", path.display())]
    Bind { path: PathBuf, reason: String },
}

// ── Platform table ───────────────────────────────────────────────────────────

/// One downloadable pdfium build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Platform {
    os: &'static str,
    arch: &'static str,
    /// Release asset, e.g. `pdfium-linux-x64.tgz`.
    archive: &'static str,
    /// Library file name inside the archive and on disk.
    lib_name: &'static str,
}

impl Platform {
    /// Windows archives keep the DLL under `bin/`, everything else under `lib/`.
    fn member(&self) -> String {
        let dir = if self.os == "windows" { "bin" } else { "lib" };
        format!("{dir}/{}", self.lib_name)
    }

    fn url(&self) -> String {
        format!("{BASE_URL}/chromium%2F{PDFIUM_VERSION}/{}", self.archive)
    }
}

const PLATFORMS: &[Platform] = &[
    Platform { os: "linux", arch: "x86_64", archive: "pdfium-linux-x64.tgz", lib_name: "libpdfium.so" },
    Platform { os: "linux", arch: "aarch64", archive: "pdfium-linux-arm64.tgz", lib_name: "libpdfium.so" },
    Platform { os: "macos", arch: "aarch64", archive: "pdfium-mac-arm64.tgz", lib_name: "libpdfium.dylib" },
    Platform { os: "macos", arch: "x86_64", archive: "pdfium-mac-x64.tgz", lib_name: "libpdfium.dylib" },
    Platform { os: "windows", arch: "x86_64", archive: "pdfium-win-x64.tgz", lib_name: "pdfium.dll" },
    Platform { os: "windows", arch: "aarch64", archive: "pdfium-win-arm64.tgz", lib_name: "pdfium.dll" },
    Platform { os: "windows", arch: "x86", archive: "pdfium-win-x86.tgz", lib_name: "pdfium.dll" },
];

fn platform_for(os: &str, arch: &str) -> Result<Platform, PdfiumAutoError> {
    PLATFORMS
        .iter()
        .find(|p| p.os == os && p.arch == arch)
        .copied()
        .ok_or_else(|| PdfiumAutoError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

fn current_platform() -> Result<Platform, PdfiumAutoError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

// ── Cache location ───────────────────────────────────────────────────────────

/// Per-version directory holding the downloaded library.
pub fn pdfium_cache_dir() -> PathBuf {
    cache_dir_from(std::env::var_os(CACHE_DIR_ENV))
}

fn cache_dir_from(override_root: Option<OsString>) -> PathBuf {
    let versioned = format!("pdfium-{PDFIUM_VERSION}");
    match override_root {
        Some(root) if !root.is_empty() => PathBuf::from(root).join(versioned),
        _ => dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_APP_DIR)
            .join(versioned),
    }
}

fn lib_override() -> Option<PathBuf> {
    std::env::var_os(LIB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// ── Public API ───────────────────────────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

/// The library path if it is available without touching the network.
pub fn cached_pdfium_path() -> Option<PathBuf> {
    if let Some(p) = lib_override() {
        return p.is_file().then_some(p);
    }
    let platform = current_platform().ok()?;
    let p = pdfium_cache_dir().join(platform.lib_name);
    p.is_file().then_some(p)
}

/// Whether [`ensure_pdfium_library`] would return without downloading.
pub fn is_pdfium_cached() -> bool {
    RESOLVED_PATH.get().is_some() || cached_pdfium_path().is_some()
}

/// Returns the library path, downloading it into the cache on first use.
///
/// Concurrent first calls may both download; the rename into place keeps the
/// cached file whole either way.
pub fn ensure_pdfium_library(
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<PathBuf, PdfiumAutoError> {
    if let Some(path) = RESOLVED_PATH.get() {
        return Ok(path.clone());
    }

    let path = resolve(on_progress)?;
    Ok(RESOLVED_PATH.get_or_init(|| path).clone())
}

/// Loads the library at `path` into a `Pdfium` instance.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumAutoError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumAutoError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Download and extraction ──────────────────────────────────────────────────

fn resolve(on_progress: Option<DownloadProgress<'_>>) -> Result<PathBuf, PdfiumAutoError> {
    if let Some(p) = lib_override() {
        return if p.is_file() {
            Ok(p)
        } else {
            Err(PdfiumAutoError::MissingOverride { path: p })
        };
    }

    let platform = current_platform()?;
    let cache_dir = pdfium_cache_dir();
    let lib_path = cache_dir.join(platform.lib_name);
    if lib_path.is_file() {
        return Ok(lib_path);
    }

    std::fs::create_dir_all(&cache_dir).map_err(|source| PdfiumAutoError::CacheDir {
        path: cache_dir.clone(),
        source,
    })?;

    let archive = download(&platform.url(), on_progress)?;
    extract_member(&archive, &platform.member(), &lib_path)?;
    Ok(lib_path)
}

fn download(
    url: &str,
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<Vec<u8>, PdfiumAutoError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-auto/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumAutoError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumAutoError::Download(format!("GET {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PdfiumAutoError::Download(format!("HTTP {status} for {url}")));
    }

    let total = response.content_length();
    let mut out = Vec::with_capacity(total.unwrap_or(0) as usize);
    copy_with_progress(&mut response, &mut out, total, on_progress)
        .map_err(|e| PdfiumAutoError::Download(format!("Read error: {e}")))?;
    Ok(out)
}

/// `io::copy` that reports the running byte count after each chunk.
fn copy_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    total: Option<u64>,
    on_progress: Option<DownloadProgress<'_>>,
) -> io::Result<u64> {
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut done: u64 = 0;
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => return Ok(done),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&chunk[..n])?;
        done += n as u64;
        if let Some(cb) = on_progress {
            cb(done, total);
        }
    }
}

/// Copies `member` out of a `.tgz` into `dest`, via a temporary file in the
/// same directory.
fn extract_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), PdfiumAutoError> {
    let extract_err = |e: io::Error| PdfiumAutoError::Extract(e.to_string());
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));

    let mut reader = tar::Archive::new(flate2::read::GzDecoder::new(archive));
    for entry in reader.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        if entry.path().map_err(extract_err)? != Path::new(member) {
            continue;
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(".pdfium-")
            .tempfile_in(dir)
            .map_err(extract_err)?;
        io::copy(&mut entry, &mut tmp).map_err(extract_err)?;
        tmp.flush().map_err(extract_err)?;
        tmp.persist(dest)
            .map_err(|e| PdfiumAutoError::Extract(format!("Cannot move into place: {}", e.error)))?;
        return Ok(());
    }

    Err(PdfiumAutoError::Extract(format!(
        "'{member}' not found in archive"
    )))
}
