const SUMMARY_CHAR_LIMIT: usize = 200;
const ELLIPSIS: &str = "...";

/// Capability seam for content summarization, so a real external
/// summarization call can replace the placeholder without touching the
/// query service.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, paragraphs: &[String]) -> String;
}

/// Placeholder summarizer: concatenate and truncate. Deterministic, no
/// external calls.
pub struct TruncatingSummarizer;

impl Summarizer for TruncatingSummarizer {
    fn summarize(&self, paragraphs: &[String]) -> String {
        let content = paragraphs.join(" ");
        if content.chars().count() > SUMMARY_CHAR_LIMIT {
            let truncated: String = content.chars().take(SUMMARY_CHAR_LIMIT).collect();
            format!("{}{}", truncated, ELLIPSIS)
        } else {
            content
        }
    }
}
