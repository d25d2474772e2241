//! The summarisation prompt.
//!
//! Kept in one place so a wording change touches exactly one constant, and so
//! tests can inspect the filled prompt without a live model.

/// Placeholder replaced by the (possibly truncated) paper text.
pub const CONTENT_PLACEHOLDER: &str = "<<CONTENT>>";

/// Instruction template sent as the single user message.
///
/// The 5–7 point constraint is advisory: the model's reply is persisted as-is
/// and never checked against it.
pub const SUMMARY_INSTRUCTION: &str = r#"
Summarize the following research paper:
1. The resulting summary should be in concise, easy-to-read markdown format.
2. The resulting summary should have the title of the research paper as the header.
3. The resulting summary should be 5-7 point-form sentences.
4. The resulting summary should cover all the important topics.
5. Do not include any text other than the summary.

Research Paper:
<<CONTENT>>
"#;

/// Fill [`SUMMARY_INSTRUCTION`] with `content`.
pub fn summary_prompt(content: &str) -> String {
    SUMMARY_INSTRUCTION.replace(CONTENT_PLACEHOLDER, content)
}
