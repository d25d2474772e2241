//! Output directories: `papers/`, `extract/` and `summary/`.
//!
//! Every run starts from empty directories. Clearing is best-effort: an entry
//! that cannot be removed is logged and skipped, and the run proceeds.

use crate::error::DigestError;
use crate::paper::PaperRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PAPERS_DIR: &str = "papers";
pub const EXTRACT_DIR: &str = "extract";
pub const SUMMARY_DIR: &str = "summary";

/// The three output directories under a common root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn papers_dir(&self) -> PathBuf {
        self.root.join(PAPERS_DIR)
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.root.join(EXTRACT_DIR)
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.root.join(SUMMARY_DIR)
    }

    /// All three directories, in creation order.
    pub fn dirs(&self) -> [PathBuf; 3] {
        [self.papers_dir(), self.extract_dir(), self.summary_dir()]
    }

    /// `papers/<stem>.pdf`
    pub fn pdf_path(&self, paper: &PaperRecord) -> PathBuf {
        self.papers_dir().join(format!("{}.pdf", paper.file_stem()))
    }

    /// `extract/<stem>.txt`
    pub fn extract_path(&self, paper: &PaperRecord) -> PathBuf {
        self.extract_dir().join(format!("{}.txt", paper.file_stem()))
    }

    /// `summary/<stem>.md`
    pub fn summary_path(&self, paper: &PaperRecord) -> PathBuf {
        self.summary_dir().join(format!("{}.md", paper.file_stem()))
    }

    /// Create each directory if absent, then empty it.
    ///
    /// Only directory creation can fail; removal failures are logged.
    pub fn prepare(&self) -> Result<(), DigestError> {
        prepare_workspace(&self.dirs())
    }
}

/// Create every directory in `dirs` if absent and remove all of its entries.
pub fn prepare_workspace<P: AsRef<Path>>(dirs: &[P]) -> Result<(), DigestError> {
    for dir in dirs {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| DigestError::WorkspaceFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let removed = clear_dir(dir);
        debug!("Cleared {} entries from {}", removed, dir.display());
    }
    Ok(())
}

/// Remove every entry inside `dir`, returning how many were removed.
///
/// Files and symbolic links are unlinked (a link to a directory is not
/// followed); directories are removed recursively.
pub fn clear_dir(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to list {}. Reason: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!("Failed to read an entry of {}. Reason: {}", dir.display(), e);
                continue;
            }
        };
        match remove_entry(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to delete {}. Reason: {}", path.display(), e),
        }
    }
    removed
}

fn remove_entry(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
