//! Pipeline stages for the arXiv digest.
//!
//! Each submodule implements one step, so each can be tested on its own and
//! swapped behind its trait without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! feed ──▶ download ──▶ extract ──▶ tokens/summarize ──▶ workspace
//! (Atom)   (HTTP GET)   (pdfium)    (halve + LLM)        (files)
//! ```
//!
//! 1. [`feed`]       build the query URL, parse the Atom response into
//!    [`crate::paper::PaperRecord`]s; defines the [`feed::PaperSource`] seam
//! 2. [`download`]   fetch the PDF at the record's derived link
//! 3. [`extract`]    concatenate page text; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 4. [`tokens`]     exact tiktoken counts for the budget check
//! 5. [`summarize`]  halve to budget, fill the prompt, call the LLM
//! 6. [`workspace`]  create and clear `papers/`, `extract/`, `summary/`

pub mod download;
pub mod extract;
pub mod feed;
pub mod summarize;
pub mod tokens;
pub mod workspace;
