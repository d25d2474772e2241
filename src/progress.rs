//! Progress-callback trait for per-paper pipeline events.
//!
//! Inject an [`Arc<dyn DigestProgressCallback>`] via
//! [`crate::digest::Digest::with_progress`] to be told when each stage of each
//! paper begins. The library never prints; the CLI implements this trait to
//! write its console lines, and tests implement it to record the event order.
//!
//! # Example
//!
//! ```rust
//! use edgequake_arxiv_digest::DigestProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountSummaries(AtomicUsize);
//!
//! impl DigestProgressCallback for CountSummaries {
//!     fn on_summarize_start(&self, _title: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::output::{PaperOutcome, RunReport};
use std::sync::Arc;

/// Called by the orchestrator as it moves through each paper.
///
/// All methods default to no-ops. Papers are processed one at a time, so
/// calls never overlap, but implementations must still be `Send + Sync`
/// to be shared behind an `Arc`.
pub trait DigestProgressCallback: Send + Sync {
    /// The feed returned `count` papers.
    fn on_search_complete(&self, query: &str, count: usize) {
        let _ = (query, count);
    }

    /// About to download the PDF for `title`.
    fn on_download_start(&self, title: &str) {
        let _ = title;
    }

    /// About to extract text from the downloaded PDF.
    fn on_extract_start(&self, title: &str) {
        let _ = title;
    }

    /// About to truncate and summarise the extracted text.
    fn on_summarize_start(&self, title: &str) {
        let _ = title;
    }

    /// All three files for a paper have been written.
    fn on_paper_complete(&self, outcome: &PaperOutcome) {
        let _ = outcome;
    }

    /// A paper failed and the run is continuing without it.
    fn on_paper_error(&self, title: &str, error: &str) {
        let _ = (title, error);
    }

    /// Every paper has been handled.
    fn on_run_complete(&self, report: &RunReport) {
        let _ = report;
    }
}

/// Callback that ignores every event.
pub struct NoopProgress;

impl DigestProgressCallback for NoopProgress {}

/// Shared callback handle.
pub type ProgressCallback = Arc<dyn DigestProgressCallback>;
