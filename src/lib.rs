//! # edgequake-arxiv-digest
//!
//! Search arXiv, pull each matching paper's PDF, extract its text, and ask an
//! LLM for a short Markdown summary.
//!
//! ## Pipeline Overview
//!
//! ```text
//! query
//!  │
//!  ├─ 1. Search     arXiv export API → Atom feed → PaperRecords
//!  ├─ 2. Workspace  create + clear papers/ extract/ summary/
//!  └─ for each paper, one at a time:
//!     ├─ 3. Download   abs link → pdf link → papers/<title>.pdf
//!     ├─ 4. Extract    pdfium page text → extract/<title>.txt
//!     ├─ 5. Truncate   halve until it fits the token budget (cl100k_base)
//!     └─ 6. Summarize  fixed instruction prompt → summary/<title>.md
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_arxiv_digest::{Digest, DigestConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // OPENAI_API_KEY from the environment
//!     let config = DigestConfig::from_env();
//!     let digest = Digest::from_config(config)?;
//!     let report = digest.run("transformer").await?;
//!     for paper in &report.papers {
//!         println!("{} → {}", paper.title, paper.summary_path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `arxiv-digest` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod digest;
pub mod error;
pub mod output;
pub mod paper;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DigestConfig, DigestConfigBuilder};
pub use digest::Digest;
pub use error::{DigestError, PaperFailure};
pub use output::{PaperOutcome, RunReport};
pub use paper::{pdf_link, sanitize_title, PaperRecord};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::feed::{ArxivSource, PaperSource};
pub use pipeline::summarize::{truncate_to_budget, CompletionService, LlmCompletion, Summarizer};
pub use pipeline::tokens::{count_tokens, count_tokens_named, Encoding};
pub use pipeline::workspace::{prepare_workspace, Workspace};
pub use progress::{DigestProgressCallback, NoopProgress, ProgressCallback};
