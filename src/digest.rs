//! Pipeline orchestration: one query in, one summary file per paper out.
//!
//! ```text
//! search ──▶ prepare workspace ──▶ for each paper:
//!     download ─▶ papers/<t>.pdf
//!     extract  ─▶ extract/<t>.txt   (title + full text)
//!     truncate ─▶ summarize ─▶ summary/<t>.md
//! ```
//!
//! Papers are processed strictly one at a time, and every output is written
//! as soon as its stage finishes. The extract file always holds the full
//! text; only the prompt sees the truncated copy.
//!
//! By default the first error ends the run. With
//! [`DigestConfig::continue_on_error`] a failing paper is recorded in
//! [`RunReport::failures`] and the loop moves on.

use crate::config::DigestConfig;
use crate::error::{DigestError, PaperFailure};
use crate::output::{PaperOutcome, RunReport};
use crate::paper::PaperRecord;
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use crate::pipeline::feed::{ArxivSource, PaperSource};
use crate::pipeline::summarize::{CompletionService, LlmCompletion, Summarizer};
use crate::pipeline::workspace::Workspace;
use crate::progress::{NoopProgress, ProgressCallback};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A configured pipeline.
///
/// `S` supplies papers, `X` turns PDFs into text, `C` writes summaries.
/// [`Digest::from_config`] wires the production arXiv / pdfium / LLM trio.
pub struct Digest<S, X, C> {
    source: S,
    extractor: X,
    summarizer: Summarizer<C>,
    workspace: Workspace,
    config: DigestConfig,
    progress: ProgressCallback,
}

impl Digest<ArxivSource, PdfiumExtractor, LlmCompletion> {
    /// Build the production pipeline from `config`.
    ///
    /// Fails if the HTTP client cannot be built or no completion provider is
    /// configured (e.g. `OPENAI_API_KEY` missing).
    pub fn from_config(config: DigestConfig) -> Result<Self, DigestError> {
        let source = ArxivSource::new(&config)?;
        let completion = LlmCompletion::from_config(&config)?;
        Ok(Self::new(
            source,
            PdfiumExtractor::from_env(),
            completion,
            config,
        ))
    }
}

impl<S, X, C> Digest<S, X, C>
where
    S: PaperSource,
    X: TextExtractor,
    C: CompletionService,
{
    pub fn new(source: S, extractor: X, completion: C, config: DigestConfig) -> Self {
        Self {
            source,
            extractor,
            summarizer: Summarizer::new(completion, &config),
            workspace: Workspace::new(config.output_root.clone()),
            config,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Receive stage events while the pipeline runs.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Search for `query` and summarise every paper returned.
    ///
    /// The output directories are cleared after the search succeeds and
    /// before the first paper is downloaded.
    pub async fn run(&self, query: &str) -> Result<RunReport, DigestError> {
        let start = Instant::now();
        info!("Starting digest for query: {}", query);

        let papers = self
            .source
            .search(query, self.config.start, self.config.max_results)
            .await?;
        self.progress.on_search_complete(query, papers.len());

        self.workspace.prepare()?;

        let mut report = RunReport {
            query: query.to_string(),
            found: papers.len(),
            ..RunReport::default()
        };

        for paper in &papers {
            match self.process_paper(paper).await {
                Ok(outcome) => {
                    self.progress.on_paper_complete(&outcome);
                    report.papers.push(outcome);
                }
                Err(e) if self.config.continue_on_error => {
                    warn!("Skipping '{}': {}", paper.title, e);
                    let failure = PaperFailure::new(&paper.title, &e);
                    self.progress.on_paper_error(&failure.title, &failure.error);
                    report.failures.push(failure);
                }
                Err(e) => return Err(e),
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Digest complete: {}/{} papers, {}ms",
            report.papers.len(),
            report.found,
            report.duration_ms
        );
        self.progress.on_run_complete(&report);
        Ok(report)
    }

    async fn process_paper(&self, paper: &PaperRecord) -> Result<PaperOutcome, DigestError> {
        // ── Download ─────────────────────────────────────────────────────
        self.progress.on_download_start(&paper.title);
        let pdf = self.source.download(paper).await?;
        let pdf_bytes = pdf.len();
        let pdf_path = self.workspace.pdf_path(paper);
        write_file(&pdf_path, &pdf).await?;

        // ── Extract ──────────────────────────────────────────────────────
        self.progress.on_extract_start(&paper.title);
        let text = self.extractor.extract(pdf).await?;
        let extract_path = self.workspace.extract_path(paper);
        write_file(&extract_path, format!("{}\n{}", paper.title, text)).await?;

        // ── Summarize ────────────────────────────────────────────────────
        self.progress.on_summarize_start(&paper.title);
        let summary = self.summarizer.summarize(&paper.title, &text).await?;
        let summary_path = self.workspace.summary_path(paper);
        write_file(&summary_path, &summary.markdown).await?;

        Ok(PaperOutcome {
            title: paper.title.clone(),
            file_stem: paper.file_stem(),
            pdf_link: paper.pdf_link(),
            pdf_path,
            extract_path,
            summary_path,
            pdf_bytes,
            extracted_chars: text.chars().count(),
            prompt_tokens: summary.prompt_tokens,
            halvings: summary.halvings,
        })
    }
}

async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), DigestError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| DigestError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
