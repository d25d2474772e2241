//! Paper records returned by the search feed.

use serde::{Deserialize, Serialize};

/// One entry from the search feed.
///
/// Records are transient: each lives for one pipeline iteration and is
/// identified on disk only through [`PaperRecord::file_stem`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Feed entry id, e.g. `http://arxiv.org/abs/1706.03762v7`.
    pub id: String,
    /// Paper title with internal whitespace runs collapsed.
    pub title: String,
    /// Link to the abstract page, e.g. `http://arxiv.org/abs/1706.03762v7`.
    pub abstract_link: String,
    /// Abstract text.
    pub summary: String,
    pub authors: Vec<String>,
    pub published: String,
    pub updated: String,
}

impl PaperRecord {
    /// Minimal record carrying only what the pipeline needs.
    pub fn new(title: impl Into<String>, abstract_link: impl Into<String>) -> Self {
        let abstract_link = abstract_link.into();
        Self {
            id: abstract_link.clone(),
            title: title.into(),
            abstract_link,
            ..Self::default()
        }
    }

    /// PDF download URL: the abstract link with every `abs` replaced by `pdf`.
    pub fn pdf_link(&self) -> String {
        pdf_link(&self.abstract_link)
    }

    /// Base name shared by the `.pdf`, `.txt` and `.md` outputs of this paper.
    pub fn file_stem(&self) -> String {
        sanitize_title(&self.title)
    }
}

/// Replace every `/` in a title with `-` so it can be used as a file name.
///
/// Two titles that differ only in `/` vs `-` map to the same name; the later
/// paper's files overwrite the earlier one's.
pub fn sanitize_title(title: &str) -> String {
    title.replace('/', "-")
}

/// Derive the PDF URL from an abstract-page URL.
///
/// Every occurrence of `abs` is replaced, matching the feed provider's
/// `/abs/<id>` → `/pdf/<id>` convention. Links without `abs` are returned
/// unchanged.
pub fn pdf_link(abstract_link: &str) -> String {
    abstract_link.replace("abs", "pdf")
}
