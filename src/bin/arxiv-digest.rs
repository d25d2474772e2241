//! CLI binary for edgequake-arxiv-digest.
//!
//! A thin shim over the library crate that maps CLI flags to `DigestConfig`,
//! prints one progress line per stage, and optionally dumps the run report.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_arxiv_digest::{
    Digest, DigestConfig, DigestProgressCallback, Encoding, PaperOutcome, ProgressCallback,
    RunReport,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── Console progress ─────────────────────────────────────────────────────────

fn download_line(title: &str) -> String {
    format!("Downloading PDF for {title}...")
}

fn extract_line(title: &str) -> String {
    format!("Extracting content from {title}...")
}

fn summarize_line(title: &str) -> String {
    format!("Summarizing {title}...")
}

fn completion_line(report: &RunReport) -> String {
    if report.failures.is_empty() {
        "All PDFs downloaded and content extracted successfully.".to_string()
    } else {
        format!(
            "Finished: {}/{} papers summarized, {} failed.",
            report.papers.len(),
            report.found,
            report.failures.len()
        )
    }
}

/// Prints one line as each stage of each paper starts.
struct ConsoleProgress;

impl DigestProgressCallback for ConsoleProgress {
    fn on_download_start(&self, title: &str) {
        println!("{}", download_line(title));
    }

    fn on_extract_start(&self, title: &str) {
        println!("{}", extract_line(title));
    }

    fn on_summarize_start(&self, title: &str) {
        println!("{}", summarize_line(title));
    }

    fn on_paper_complete(&self, outcome: &PaperOutcome) {
        if outcome.halvings > 0 {
            println!(
                "{}",
                dim(&format!(
                    "  text halved {}× to {} tokens",
                    outcome.halvings, outcome.prompt_tokens
                ))
            );
        }
    }

    fn on_paper_error(&self, title: &str, error: &str) {
        eprintln!("{} {title}: {error}", red("✗"));
    }

    fn on_run_complete(&self, report: &RunReport) {
        println!("{}", completion_line(report));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Prompt for the query interactively
  arxiv-digest

  # Summarise the top 5 results for a query
  arxiv-digest "transformer"

  # Ten results, written under ./out
  arxiv-digest --max-results 10 --output-dir out "diffusion models"

  # Keep going when a paper fails, print the report as JSON
  arxiv-digest --keep-going --json "graph neural networks"

OUTPUT (relative to --output-dir, cleared at the start of every run):
  papers/<title>.pdf     downloaded PDF
  extract/<title>.txt    title line + full extracted text
  summary/<title>.md     LLM summary

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (also read from ./.env)
  ARXIV_DIGEST_MODEL      Override model ID
  ARXIV_DIGEST_PROVIDER   Use another provider (anthropic, gemini, ollama, …)
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. edgequake_arxiv_digest=debug
"#;

/// Summarise recent arXiv papers matching a query.
#[derive(Parser, Debug)]
#[command(
    name = "arxiv-digest",
    version,
    about = "Search arXiv, extract paper text and summarise each paper to Markdown",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Search query. Prompted for on stdin when omitted.
    query: Option<String>,

    /// Completion-service API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM model ID.
    #[arg(long, env = "ARXIV_DIGEST_MODEL", default_value = edgequake_arxiv_digest::config::DEFAULT_MODEL)]
    model: String,

    /// LLM provider name; defaults to OpenAI with --api-key.
    #[arg(long, env = "ARXIV_DIGEST_PROVIDER")]
    provider: Option<String>,

    /// Number of feed results to summarise.
    #[arg(short = 'n', long, env = "ARXIV_DIGEST_MAX_RESULTS", default_value_t = 5)]
    max_results: usize,

    /// Feed offset of the first result.
    #[arg(long, env = "ARXIV_DIGEST_START", default_value_t = 0)]
    start: usize,

    /// Maximum tokens of paper text sent to the model.
    #[arg(long, env = "ARXIV_DIGEST_TOKEN_BUDGET", default_value_t = edgequake_arxiv_digest::config::DEFAULT_TOKEN_BUDGET)]
    token_budget: usize,

    /// Tokenizer encoding used for the budget.
    #[arg(long, env = "ARXIV_DIGEST_ENCODING", default_value = "cl100k_base", value_parser = parse_encoding)]
    encoding: Encoding,

    /// Directory holding papers/, extract/ and summary/.
    #[arg(short, long, env = "ARXIV_DIGEST_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Feed endpoint.
    #[arg(long, env = "ARXIV_DIGEST_FEED_URL", default_value = edgequake_arxiv_digest::config::DEFAULT_FEED_URL)]
    feed_url: String,

    /// Per-request HTTP timeout in seconds (default: none).
    #[arg(long, env = "ARXIV_DIGEST_HTTP_TIMEOUT")]
    http_timeout: Option<u64>,

    /// Skip papers that fail instead of stopping the run.
    #[arg(long, env = "ARXIV_DIGEST_KEEP_GOING")]
    keep_going: bool,

    /// Print the run report as JSON on stdout instead of progress lines.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ARXIV_DIGEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ARXIV_DIGEST_QUIET")]
    quiet: bool,
}

fn parse_encoding(s: &str) -> std::result::Result<Encoding, String> {
    s.parse::<Encoding>().map_err(|e| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env file is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let query = match cli.query.clone() {
        Some(q) => q,
        None => prompt_query().context("Failed to read search query")?,
    };
    if query.trim().is_empty() {
        anyhow::bail!("Search query must not be empty");
    }

    let config = build_config(&cli)?;
    let show_progress = !cli.quiet && !cli.json;

    let mut digest = Digest::from_config(config).context("Failed to set up pipeline")?;
    if show_progress {
        digest = digest.with_progress(Arc::new(ConsoleProgress) as ProgressCallback);
    }

    let report = digest.run(&query).await.context("Digest failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    Ok(())
}

/// Ask for the query on stdout and read one line from stdin.
fn prompt_query() -> Result<String> {
    print!("Enter your search query: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Map CLI args to `DigestConfig`.
fn build_config(cli: &Cli) -> Result<DigestConfig> {
    let mut builder = DigestConfig::builder()
        .model(&cli.model)
        .max_results(cli.max_results)
        .start(cli.start)
        .token_budget(cli.token_budget)
        .encoding(cli.encoding)
        .output_root(&cli.output_dir)
        .feed_url(&cli.feed_url)
        .continue_on_error(cli.keep_going);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(secs) = cli.http_timeout {
        builder = builder.http_timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}
