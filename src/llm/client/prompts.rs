//! Default prompt templates.

/// Default prompt for summarizing OCR output.
///
/// Placeholders: `{language}` (answer language) and `{content}` (document text).
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You are an expert in analyzing documents.
The text may contain recognition artifacts: broken words, stray symbols (|, #), typos.

Task:
1. Ignore junk symbols and artifacts
2. Restore the meaning where possible
3. Write a concise summary in {language}
4. Highlight key facts: dates, amounts, parties, subject of the document
5. Respond with ONLY the summary, no introductory phrases

Text:
{content}

Summary:"#;

/// Header of the aggregation input built from per-file summaries.
pub const AGGREGATION_HEADER: &str = "Summaries of individual documents:\n\n";

/// Labels some models echo back in front of the answer.
pub const SUMMARY_LABELS: &[&str] = &["Summary:", "Саммари:", "Резюме:"];
