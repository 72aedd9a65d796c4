//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the converter walks the input directory.
//!
//! # Example
//!
//! ```rust
//! use pdf2txt::{BatchConfig, BatchProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, path: &Path, chars: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{}/{}] {} ({} chars)", index, total, path.display(), chars);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .output_dir("text")
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch converter as it processes each PDF.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed one at a time, so events for a
/// batch never interleave.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the input directory was scanned.
    ///
    /// # Arguments
    /// * `total_files` — number of PDFs that will be attempted
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a PDF is handed to the extractor.
    ///
    /// `index` is 1-based.
    fn on_file_start(&self, index: usize, total_files: usize, path: &Path) {
        let _ = (index, total_files, path);
    }

    /// Called when a PDF's text file is in place.
    ///
    /// # Arguments
    /// * `chars` — character count of the extracted text
    fn on_file_complete(&self, index: usize, total_files: usize, path: &Path, chars: usize) {
        let _ = (index, total_files, path, chars);
    }

    /// Called when a PDF could not be converted.
    fn on_file_error(&self, index: usize, total_files: usize, path: &Path, error: &str) {
        let _ = (index, total_files, path, error);
    }

    /// Called once after the last file was attempted.
    ///
    /// # Arguments
    /// * `attempted` — files handed to the extractor
    /// * `succeeded` — files whose output was written
    fn on_batch_complete(&self, attempted: usize, succeeded: usize) {
        let _ = (attempted, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        started_total: AtomicUsize,
        succeeded_total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.started_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _path: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _path: &Path, _chars: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _path: &Path, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _attempted: usize, succeeded: usize) {
            self.succeeded_total.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, Path::new("a.pdf"));
        cb.on_file_complete(1, 2, Path::new("a.pdf"), 42);
        cb.on_file_error(2, 2, Path::new("b.pdf"), "bad header");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_batch_start(3);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        tracker.on_file_start(1, 3, Path::new("a.pdf"));
        tracker.on_file_complete(1, 3, Path::new("a.pdf"), 10);
        tracker.on_file_start(2, 3, Path::new("b.pdf"));
        tracker.on_file_error(2, 3, Path::new("b.pdf"), "corrupt");
        tracker.on_file_start(3, 3, Path::new("c.pdf"));
        tracker.on_file_complete(3, 3, Path::new("c.pdf"), 20);
        tracker.on_batch_complete(3, 2);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.succeeded_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_file_start(1, 1, Path::new("x.pdf"));
    }
}
