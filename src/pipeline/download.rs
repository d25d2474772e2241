//! PDF download.
//!
//! One GET per paper, whole body buffered in memory. The body is not checked
//! for PDF magic here; a non-PDF response is caught by the extractor.

use crate::error::DigestError;
use crate::paper::PaperRecord;
use tracing::{debug, info};

/// Fetch the PDF for `paper` from its derived PDF link.
pub async fn download_pdf(
    http: &reqwest::Client,
    paper: &PaperRecord,
) -> Result<Vec<u8>, DigestError> {
    let url = paper.pdf_link();
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| DigestError::DownloadFailed {
        url: url.clone(),
        reason,
    };

    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| failed(e.to_string()))?;

    debug!("Downloaded {} bytes for '{}'", bytes.len(), paper.title);
    Ok(bytes.to_vec())
}
