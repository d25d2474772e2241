//! Token estimation with the tiktoken BPE tables.
//!
//! Counts are exact for the chosen encoding, not an estimate.
//!
//! Loading a BPE table parses a few megabytes of vocabulary. Each table is
//! built on first use and cached for the life of the process; the truncation
//! loop calls [`count_tokens`] once per halving.

use crate::error::DigestError;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, p50k_base, p50k_edit, r50k_base, CoreBPE};

/// A tokenizer encoding understood by [`count_tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// GPT-3.5 / GPT-4 family. (default)
    #[default]
    Cl100kBase,
    /// Codex and text-davinci-002/003.
    P50kBase,
    /// Edit models.
    P50kEdit,
    /// GPT-3 (davinci, curie, …).
    R50kBase,
}

impl Encoding {
    /// The identifier tiktoken uses for this encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::P50kEdit => "p50k_edit",
            Encoding::R50kBase => "r50k_base",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cl100k_base" => Ok(Encoding::Cl100kBase),
            "p50k_base" => Ok(Encoding::P50kBase),
            "p50k_edit" => Ok(Encoding::P50kEdit),
            "r50k_base" => Ok(Encoding::R50kBase),
            other => Err(DigestError::UnknownEncoding(other.to_string())),
        }
    }
}

static CL100K: OnceCell<CoreBPE> = OnceCell::new();
static P50K: OnceCell<CoreBPE> = OnceCell::new();
static P50K_EDIT: OnceCell<CoreBPE> = OnceCell::new();
static R50K: OnceCell<CoreBPE> = OnceCell::new();

fn bpe(encoding: Encoding) -> Result<&'static CoreBPE, DigestError> {
    let loaded = match encoding {
        Encoding::Cl100kBase => CL100K.get_or_try_init(|| cl100k_base().map_err(|e| e.to_string())),
        Encoding::P50kBase => P50K.get_or_try_init(|| p50k_base().map_err(|e| e.to_string())),
        Encoding::P50kEdit => P50K_EDIT.get_or_try_init(|| p50k_edit().map_err(|e| e.to_string())),
        Encoding::R50kBase => R50K.get_or_try_init(|| r50k_base().map_err(|e| e.to_string())),
    };
    loaded.map_err(DigestError::Tokenizer)
}

/// Number of tokens `text` occupies under `encoding`.
///
/// Special-token markers such as `<|endoftext|>` are counted as the single
/// token they encode to rather than rejected; extracted paper text can
/// legitimately contain them.
pub fn count_tokens(text: &str, encoding: Encoding) -> Result<usize, DigestError> {
    Ok(bpe(encoding)?.encode_with_special_tokens(text).len())
}

/// Like [`count_tokens`], with the encoding named by its tiktoken identifier.
pub fn count_tokens_named(text: &str, encoding: &str) -> Result<usize, DigestError> {
    count_tokens(text, encoding.parse()?)
}
