//! Search feed: query the arXiv export API and parse its Atom response.
//!
//! The feed is returned in the provider's own order (relevance by default).
//! Nothing is re-sorted or deduplicated here.

use crate::config::DigestConfig;
use crate::error::DigestError;
use crate::paper::PaperRecord;
use crate::pipeline::download;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("edgequake-arxiv-digest/", env!("CARGO_PKG_VERSION"));

/// Where papers come from: a search feed plus a way to fetch each PDF.
///
/// [`ArxivSource`] is the production implementation; tests substitute an
/// in-memory one.
pub trait PaperSource {
    /// Run `query` and return at most `max_results` records starting at `start`.
    fn search(
        &self,
        query: &str,
        start: usize,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<PaperRecord>, DigestError>> + Send;

    /// Retrieve the raw PDF bytes for `paper`.
    fn download(
        &self,
        paper: &PaperRecord,
    ) -> impl Future<Output = Result<Vec<u8>, DigestError>> + Send;
}

/// arXiv export API over HTTP.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    http: reqwest::Client,
    feed_url: String,
}

impl ArxivSource {
    /// Build a client from the feed URL and timeout in `config`.
    pub fn new(config: &DigestConfig) -> Result<Self, DigestError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DigestError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            feed_url: config.feed_url.clone(),
        })
    }
}

impl PaperSource for ArxivSource {
    async fn search(
        &self,
        query: &str,
        start: usize,
        max_results: usize,
    ) -> Result<Vec<PaperRecord>, DigestError> {
        let url = feed_url(&self.feed_url, query, start, max_results)?;
        info!("Querying feed: {}", url);

        let fetch_err = |reason: String| DigestError::FeedFetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }
        let body = response.text().await.map_err(|e| fetch_err(e.to_string()))?;

        let papers = parse_feed(&body)?;
        info!("Feed returned {} entries", papers.len());
        Ok(papers)
    }

    async fn download(&self, paper: &PaperRecord) -> Result<Vec<u8>, DigestError> {
        download::download_pdf(&self.http, paper).await
    }
}

/// Build the feed query URL.
///
/// The query is form-encoded (spaces become `+`, reserved characters are
/// percent-escaped).
pub fn feed_url(
    base: &str,
    query: &str,
    start: usize,
    max_results: usize,
) -> Result<Url, DigestError> {
    let start = start.to_string();
    let max_results = max_results.to_string();
    Url::parse_with_params(
        base,
        &[
            ("search_query", query),
            ("start", start.as_str()),
            ("max_results", max_results.as_str()),
        ],
    )
    .map_err(|e| DigestError::InvalidConfig(format!("Feed URL '{base}': {e}")))
}

#[derive(Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    Updated,
    AuthorName,
}

/// Parse an Atom feed into paper records, in document order.
///
/// Feed-level elements (the feed's own `<title>`, `<link>`, …) are ignored;
/// only `<entry>` children are read.
pub fn parse_feed(xml: &str) -> Result<Vec<PaperRecord>, DigestError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut current: Option<PaperRecord> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut in_author = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            DigestError::FeedParseFailed(format!(
                "at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"entry" => current = Some(PaperRecord::default()),
                b"author" if current.is_some() => in_author = true,
                b"link" => {
                    if let Some(paper) = current.as_mut() {
                        read_link(e, paper)?;
                    }
                }
                name if current.is_some() => {
                    field = match name {
                        b"id" => Some(Field::Id),
                        b"title" => Some(Field::Title),
                        b"summary" => Some(Field::Summary),
                        b"published" => Some(Field::Published),
                        b"updated" => Some(Field::Updated),
                        b"name" if in_author => Some(Field::AuthorName),
                        _ => None,
                    };
                    text.clear();
                }
                _ => {}
            },
            Event::Empty(ref e) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(paper) = current.as_mut() {
                        read_link(e, paper)?;
                    }
                }
            }
            Event::Text(ref t) => {
                if field.is_some() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| DigestError::FeedParseFailed(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref c) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(mut paper) = current.take() {
                        if paper.abstract_link.is_empty() {
                            paper.abstract_link = paper.id.clone();
                        }
                        debug!("Parsed entry: {}", paper.title);
                        papers.push(paper);
                    }
                    field = None;
                }
                b"author" => in_author = false,
                _ => {
                    if let (Some(f), Some(paper)) = (field.take(), current.as_mut()) {
                        store_field(paper, f, &text);
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

fn store_field(paper: &mut PaperRecord, field: Field, text: &str) {
    match field {
        Field::Id => paper.id = text.trim().to_string(),
        Field::Title => paper.title = collapse_whitespace(text),
        Field::Summary => paper.summary = collapse_whitespace(text),
        Field::Published => paper.published = text.trim().to_string(),
        Field::Updated => paper.updated = text.trim().to_string(),
        Field::AuthorName => paper.authors.push(collapse_whitespace(text)),
    }
}

/// Take the first `rel="alternate"` link (or a link with no `rel`) as the abstract page.
fn read_link(e: &BytesStart<'_>, paper: &mut PaperRecord) -> Result<(), DigestError> {
    let mut rel: Option<String> = None;
    let mut href: Option<String> = None;
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map_err(|e| DigestError::FeedParseFailed(e.to_string()))?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"rel" => rel = Some(value),
            b"href" => href = Some(value),
            _ => {}
        }
    }
    if let Some(href) = href {
        let is_alternate = rel.as_deref().map_or(true, |r| r == "alternate");
        if is_alternate && paper.abstract_link.is_empty() {
            paper.abstract_link = href;
        }
    }
    Ok(())
}

/// Titles in the arXiv feed wrap across lines with indentation.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
