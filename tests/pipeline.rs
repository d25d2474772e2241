//! Whole-pipeline tests with in-memory paper source, extractor and model.
//!
//! Nothing here touches the network or pdfium: the fake source serves
//! `%PDF-` prefixed bytes whose remainder is the "extracted" text, and the
//! fake model records every prompt it receives.

use edgequake_arxiv_digest::{
    CompletionService, Digest, DigestConfig, DigestError, DigestProgressCallback, PaperOutcome,
    PaperRecord, PaperSource, RunReport, TextExtractor,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Fakes ────────────────────────────────────────────────────────────────────

struct FakeSource {
    papers: Vec<PaperRecord>,
    /// Per-paper body, indexed like `papers`. Missing entries use the title.
    bodies: Vec<String>,
    /// Titles whose download fails.
    fail: HashSet<String>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    fn new(papers: Vec<PaperRecord>) -> Self {
        Self {
            papers,
            bodies: Vec::new(),
            fail: HashSet::new(),
            downloads: Arc::default(),
        }
    }
}

impl PaperSource for FakeSource {
    async fn search(
        &self,
        _query: &str,
        start: usize,
        max_results: usize,
    ) -> Result<Vec<PaperRecord>, DigestError> {
        Ok(self
            .papers
            .iter()
            .skip(start)
            .take(max_results)
            .cloned()
            .collect())
    }

    async fn download(&self, paper: &PaperRecord) -> Result<Vec<u8>, DigestError> {
        self.downloads.lock().unwrap().push(paper.title.clone());
        if self.fail.contains(&paper.title) {
            return Err(DigestError::DownloadFailed {
                url: paper.pdf_link(),
                reason: "HTTP 404 Not Found".into(),
            });
        }
        let idx = self.papers.iter().position(|p| p == paper).unwrap();
        let body = self
            .bodies
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("Body of {}.", paper.title));
        Ok(format!("%PDF-{body}").into_bytes())
    }
}

/// Returns everything after the `%PDF-` prefix as text.
struct FakeExtractor;

impl TextExtractor for FakeExtractor {
    async fn extract(&self, pdf: Vec<u8>) -> Result<String, DigestError> {
        let text = String::from_utf8(pdf).map_err(|e| DigestError::CorruptPdf {
            detail: e.to_string(),
        })?;
        match text.strip_prefix("%PDF-") {
            Some(body) => Ok(body.to_string()),
            None => Err(DigestError::NotAPdf {
                magic: text.bytes().take(4).collect(),
            }),
        }
    }
}

struct FakeModel {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeModel {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Arc::default(),
        }
    }
}

impl CompletionService for FakeModel {
    async fn complete(&self, prompt: &str) -> Result<String, DigestError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
    fn push(&self, e: String) {
        self.0.lock().unwrap().push(e);
    }
}

impl DigestProgressCallback for Recorder {
    fn on_search_complete(&self, _query: &str, count: usize) {
        self.push(format!("search:{count}"));
    }
    fn on_download_start(&self, title: &str) {
        self.push(format!("download:{title}"));
    }
    fn on_extract_start(&self, title: &str) {
        self.push(format!("extract:{title}"));
    }
    fn on_summarize_start(&self, title: &str) {
        self.push(format!("summarize:{title}"));
    }
    fn on_paper_complete(&self, outcome: &PaperOutcome) {
        self.push(format!("done:{}", outcome.title));
    }
    fn on_paper_error(&self, title: &str, _error: &str) {
        self.push(format!("error:{title}"));
    }
    fn on_run_complete(&self, report: &RunReport) {
        self.push(format!("complete:{}", report.papers.len()));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn paper(n: usize) -> PaperRecord {
    PaperRecord::new(
        format!("Paper {n}"),
        format!("http://arxiv.org/abs/2401.{n:05}v1"),
    )
}

fn config(root: &Path) -> DigestConfig {
    DigestConfig::builder()
        .api_key("sk-test")
        .output_root(root)
        .build()
        .unwrap()
}

fn stems(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            path.file_stem().unwrap().to_string_lossy().into_owned()
        })
        .collect();
    names.sort();
    names
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn five_papers_produce_three_matching_files_each() {
    let tmp = TempDir::new().unwrap();
    let papers: Vec<_> = (1..=5).map(paper).collect();
    let digest = Digest::new(
        FakeSource::new(papers),
        FakeExtractor,
        FakeModel::new("# Paper\n- point"),
        config(tmp.path()),
    );

    let report = digest.run("transformer").await.unwrap();

    assert_eq!(report.found, 5);
    assert_eq!(report.papers.len(), 5);
    assert!(report.is_complete());

    let expected: Vec<String> = (1..=5).map(|n| format!("Paper {n}")).collect();
    let ws = digest.workspace();
    assert_eq!(stems(&ws.papers_dir()), expected);
    assert_eq!(stems(&ws.extract_dir()), expected);
    assert_eq!(stems(&ws.summary_dir()), expected);

    let pdf = fs::read(tmp.path().join("papers/Paper 3.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let extract = fs::read_to_string(tmp.path().join("extract/Paper 3.txt")).unwrap();
    assert_eq!(extract, "Paper 3\nBody of Paper 3.");
    assert_eq!(report.papers[2].pdf_link, "http://arxiv.org/pdf/2401.00003v1");
}

#[tokio::test]
async fn stages_run_in_order_one_paper_at_a_time() {
    let tmp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let digest = Digest::new(
        FakeSource::new(vec![paper(1), paper(2)]),
        FakeExtractor,
        FakeModel::new("ok"),
        config(tmp.path()),
    )
    .with_progress(recorder.clone());

    digest.run("q").await.unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            "search:2",
            "download:Paper 1",
            "extract:Paper 1",
            "summarize:Paper 1",
            "done:Paper 1",
            "download:Paper 2",
            "extract:Paper 2",
            "summarize:Paper 2",
            "done:Paper 2",
            "complete:2",
        ]
    );
}

#[tokio::test]
async fn long_text_is_truncated_for_the_prompt_only() {
    let tmp = TempDir::new().unwrap();
    // 50 000 tokens under cl100k_base
    let body = " hello".repeat(50_000);
    let mut source = FakeSource::new(vec![paper(1)]);
    source.bodies = vec![body.clone()];
    let model = FakeModel::new("- short");
    let prompts = model.prompts.clone();

    let digest = Digest::new(source, FakeExtractor, model, config(tmp.path()));
    let report = digest.run("q").await.unwrap();

    let outcome = &report.papers[0];
    // 50 000 → 25 000 → 12 500
    assert_eq!(outcome.halvings, 2);
    assert!(outcome.prompt_tokens <= 16_385);

    let extract = fs::read_to_string(&outcome.extract_path).unwrap();
    assert_eq!(extract, format!("Paper 1\n{body}"));

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let kept = &body[..body.len() / 4];
    assert!(prompts[0].contains(&format!("Research Paper:\n{kept}\n")));
    assert!(!prompts[0].contains(&body));
}

#[tokio::test]
async fn reply_is_written_verbatim_even_if_not_markdown() {
    let tmp = TempDir::new().unwrap();
    let reply = "This paper is about attention. It drops recurrence. It trains fast.";
    let digest = Digest::new(
        FakeSource::new(vec![paper(7)]),
        FakeExtractor,
        FakeModel::new(reply),
        config(tmp.path()),
    );

    let report = digest.run("q").await.unwrap();

    let written = fs::read_to_string(&report.papers[0].summary_path).unwrap();
    assert_eq!(written, reply);
}

#[tokio::test]
async fn empty_feed_leaves_empty_directories() {
    let tmp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let digest = Digest::new(
        FakeSource::new(Vec::new()),
        FakeExtractor,
        FakeModel::new("unused"),
        config(tmp.path()),
    )
    .with_progress(recorder.clone());

    let report = digest.run("nothing matches").await.unwrap();

    assert_eq!(report.found, 0);
    assert!(report.papers.is_empty());
    for dir in digest.workspace().dirs() {
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
    assert_eq!(recorder.events(), vec!["search:0", "complete:0"]);
}

#[tokio::test]
async fn stale_outputs_are_cleared_before_the_run() {
    let tmp = TempDir::new().unwrap();
    let old = tmp.path().join("summary");
    fs::create_dir_all(&old).unwrap();
    fs::write(old.join("Old Paper.md"), "stale").unwrap();

    let digest = Digest::new(
        FakeSource::new(vec![paper(1)]),
        FakeExtractor,
        FakeModel::new("fresh"),
        config(tmp.path()),
    );
    digest.run("q").await.unwrap();

    assert_eq!(stems(&old), vec!["Paper 1"]);
}

#[tokio::test]
async fn slash_in_title_is_replaced_in_file_names() {
    let tmp = TempDir::new().unwrap();
    let record = PaperRecord::new("Encoder/Decoder Models", "http://arxiv.org/abs/1234.5678v1");
    let digest = Digest::new(
        FakeSource::new(vec![record]),
        FakeExtractor,
        FakeModel::new("ok"),
        config(tmp.path()),
    );

    let report = digest.run("q").await.unwrap();

    assert_eq!(report.papers[0].file_stem, "Encoder-Decoder Models");
    assert!(tmp.path().join("papers/Encoder-Decoder Models.pdf").is_file());
    // The title line inside the extract keeps the original slash.
    let extract =
        fs::read_to_string(tmp.path().join("extract/Encoder-Decoder Models.txt")).unwrap();
    assert!(extract.starts_with("Encoder/Decoder Models\n"));
}

#[tokio::test]
async fn first_failure_aborts_the_run() {
    let tmp = TempDir::new().unwrap();
    let mut source = FakeSource::new((1..=3).map(paper).collect());
    source.fail.insert("Paper 2".into());
    let downloads = source.downloads.clone();

    let digest = Digest::new(source, FakeExtractor, FakeModel::new("ok"), config(tmp.path()));
    let err = digest.run("q").await.unwrap_err();

    assert!(matches!(err, DigestError::DownloadFailed { .. }));
    assert_eq!(*downloads.lock().unwrap(), vec!["Paper 1", "Paper 2"]);
    // Paper 1 finished before the failure; Paper 3 was never touched.
    assert_eq!(stems(&tmp.path().join("summary")), vec!["Paper 1"]);
    assert!(!tmp.path().join("papers/Paper 3.pdf").exists());
}

#[tokio::test]
async fn keep_going_records_failure_and_continues() {
    let tmp = TempDir::new().unwrap();
    let mut source = FakeSource::new((1..=3).map(paper).collect());
    source.fail.insert("Paper 2".into());
    let recorder = Arc::new(Recorder::default());

    let config = DigestConfig::builder()
        .api_key("sk-test")
        .output_root(tmp.path())
        .continue_on_error(true)
        .build()
        .unwrap();
    let digest = Digest::new(source, FakeExtractor, FakeModel::new("ok"), config)
        .with_progress(recorder.clone());

    let report = digest.run("q").await.unwrap();

    assert_eq!(report.papers.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].title, "Paper 2");
    assert!(!report.is_complete());
    assert_eq!(stems(&tmp.path().join("summary")), vec!["Paper 1", "Paper 3"]);
    assert!(recorder.events().contains(&"error:Paper 2".to_string()));
}

#[tokio::test]
async fn non_pdf_bytes_fail_extraction() {
    struct HtmlSource;

    impl PaperSource for HtmlSource {
        async fn search(
            &self,
            _query: &str,
            _start: usize,
            _max_results: usize,
        ) -> Result<Vec<PaperRecord>, DigestError> {
            Ok(vec![paper(1)])
        }

        async fn download(&self, _paper: &PaperRecord) -> Result<Vec<u8>, DigestError> {
            Ok(b"<html>rate limited</html>".to_vec())
        }
    }

    let tmp = TempDir::new().unwrap();
    let digest = Digest::new(HtmlSource, FakeExtractor, FakeModel::new("ok"), config(tmp.path()));

    let err = digest.run("q").await.unwrap_err();
    assert!(matches!(err, DigestError::NotAPdf { .. }));
    // The PDF is written before extraction, the extract is not.
    assert!(tmp.path().join("papers/Paper 1.pdf").exists());
    assert!(!tmp.path().join("extract/Paper 1.txt").exists());
}

#[tokio::test]
async fn start_and_max_results_window_the_feed() {
    let tmp = TempDir::new().unwrap();
    let config = DigestConfig::builder()
        .api_key("sk-test")
        .output_root(tmp.path())
        .start(1)
        .max_results(2)
        .build()
        .unwrap();
    let digest = Digest::new(
        FakeSource::new((1..=5).map(paper).collect()),
        FakeExtractor,
        FakeModel::new("ok"),
        config,
    );

    let report = digest.run("q").await.unwrap();
    let titles: Vec<_> = report.papers.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Paper 2", "Paper 3"]);
}
