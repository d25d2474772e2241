//! Error types for the edgequake-arxiv-digest library.
//!
//! Two types reflect two failure scopes:
//!
//! * [`DigestError`]: a stage failed. By default the run stops on the first
//!   one and the error is returned from [`crate::digest::Digest::run`].
//!
//! * [`PaperFailure`]: the same error, captured for one paper when the run
//!   was configured with `continue_on_error`. Stored in
//!   [`crate::output::RunReport::failures`] so the caller can report which
//!   papers were skipped.
//!
//! Failures while clearing the workspace never become errors at all: they are
//! logged and the clear moves on to the next entry.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-arxiv-digest library.
#[derive(Debug, Error)]
pub enum DigestError {
    // ── Feed errors ───────────────────────────────────────────────────────
    /// The search feed could not be retrieved.
    #[error("Failed to query feed '{url}': {reason}")]
    FeedFetchFailed { url: String, reason: String },

    /// The feed body is not a well-formed Atom document.
    #[error("Failed to parse feed: {0}")]
    FeedParseFailed(String),

    // ── Download errors ───────────────────────────────────────────────────
    /// The PDF request failed at the transport level or returned a non-2xx status.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The downloaded body does not start with the `%PDF` magic.
    #[error("Content is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { magic: Vec<u8> },

    /// pdfium could not open the document.
    #[error("PDF is corrupt or unsupported: {detail}")]
    CorruptPdf { detail: String },

    /// Text extraction failed for a single page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Tokenizer errors ──────────────────────────────────────────────────
    /// The encoding identifier is not one the tokenizer knows.
    #[error("Unknown tokenizer encoding '{0}' (expected cl100k_base, p50k_base, p50k_edit or r50k_base)")]
    UnknownEncoding(String),

    /// The tokenizer tables could not be loaded.
    #[error("Failed to load tokenizer: {0}")]
    Tokenizer(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No API key was configured for the default provider.
    #[error("OPENAI_API_KEY is not set.\nExport it or add it to a .env file in the working directory.")]
    MissingApiKey,

    /// A named provider could not be initialised.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The completion service returned an error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create an output directory.
    #[error("Failed to create directory '{path}': {source}")]
    WorkspaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write an output file.
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A paper that failed while the run kept going.
#[derive(Debug, Clone, Serialize)]
pub struct PaperFailure {
    /// Title of the paper as the feed returned it.
    pub title: String,
    /// Rendered [`DigestError`] message.
    pub error: String,
}

impl PaperFailure {
    pub fn new(title: impl Into<String>, error: &DigestError) -> Self {
        Self {
            title: title.into(),
            error: error.to_string(),
        }
    }
}
