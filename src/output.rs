//! What a run produced.

use crate::error::PaperFailure;
use serde::Serialize;
use std::path::PathBuf;

/// Files and statistics for one successfully summarised paper.
#[derive(Debug, Clone, Serialize)]
pub struct PaperOutcome {
    pub title: String,
    /// Sanitised title used as the base name of all three files.
    pub file_stem: String,
    pub pdf_link: String,
    pub pdf_path: PathBuf,
    pub extract_path: PathBuf,
    pub summary_path: PathBuf,
    /// Size of the downloaded PDF.
    pub pdf_bytes: usize,
    /// Characters of extracted text, before truncation.
    pub extracted_chars: usize,
    /// Tokens of the content embedded in the prompt.
    pub prompt_tokens: usize,
    /// Times the text was halved to fit the budget.
    pub halvings: u32,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub query: String,
    /// Number of records the feed returned.
    pub found: usize,
    /// Papers whose summary was written, in feed order.
    pub papers: Vec<PaperOutcome>,
    /// Papers skipped because of an error (only with `continue_on_error`).
    pub failures: Vec<PaperFailure>,
    pub duration_ms: u64,
}

impl RunReport {
    /// `true` when every paper the feed returned was summarised.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.papers.len() == self.found
    }
}
