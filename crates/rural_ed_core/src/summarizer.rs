//! crates/rural_ed_core/src/summarizer.rs
//!
//! The offline summarizer: extractive sentence selection followed by a hard
//! character limit.

use async_trait::async_trait;

use crate::domain::Resource;
use crate::ports::SummarizationService;

const ELLIPSIS: &str = "...";

/// Keeps the `max_sentences` longest sentences, in their original order.
pub fn extractive_summary(text: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    let mut ranked: Vec<(usize, &str)> = sentences.iter().copied().enumerate().collect();
    // Longest first; earlier sentence wins a tie.
    ranked.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()).then(a.0.cmp(&b.0)));
    ranked.truncate(max_sentences);
    ranked.sort_by_key(|(index, _)| *index);

    ranked
        .into_iter()
        .map(|(_, s)| s)
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next == ' ' {
                    let end = i + c.len_utf8();
                    sentences.push(text[start..end].trim());
                    start = end;
                }
            }
        }
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Cuts `text` to at most `max_len` characters, on a word boundary with a
/// trailing ellipsis where possible.
pub fn truncate_chars(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let budget = max_len.saturating_sub(ELLIPSIS.len());
    let mut kept = String::new();
    for word in text.split_whitespace() {
        let needed = if kept.is_empty() { 0 } else { 1 } + word.chars().count();
        if kept.chars().count() + needed > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
    }

    if kept.is_empty() {
        return text.chars().take(max_len).collect();
    }
    let kept = kept.trim_end_matches(|c: char| c.is_ascii_punctuation());
    format!("{}{}", kept, ELLIPSIS)
}

/// Deterministic, offline summarizer. Always succeeds.
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    max_sentences: usize,
}

impl MockSummarizer {
    /// `max_sentences` is 2 for short summaries, 5 for long ones.
    pub fn new(max_sentences: usize) -> Self {
        Self { max_sentences }
    }

    pub fn summarize_text(&self, text: &str, max_len: usize) -> String {
        truncate_chars(&extractive_summary(text, self.max_sentences), max_len)
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new(2)
    }
}

#[async_trait]
impl SummarizationService for MockSummarizer {
    async fn summarize(&self, text: &str, max_len: usize) -> String {
        self.summarize_text(text, max_len)
    }
}

/// Summarizes every resource in place, overwriting any earlier summary.
pub async fn summarize_all(
    summarizer: &dyn SummarizationService,
    resources: &mut [Resource],
    max_len: usize,
) {
    for resource in resources.iter_mut() {
        let summary = summarizer
            .summarize(&resource.summary_source_text(), max_len)
            .await;
        resource.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "This is the first sentence. Short one. This is a longer sentence with more words to be selected.";

    #[test]
    fn keeps_longest_sentences_in_order() {
        let summary = extractive_summary(TEXT, 2);
        assert_eq!(
            summary,
            "This is the first sentence. This is a longer sentence with more words to be selected."
        );
    }

    #[test]
    fn empty_text_gives_empty_summary() {
        assert_eq!(extractive_summary("", 2), "");
        assert_eq!(MockSummarizer::default().summarize_text("   ", 10), "");
    }

    #[test]
    fn output_never_exceeds_max_len() {
        let summarizer = MockSummarizer::default();
        let inputs = [
            TEXT,
            "Supercalifragilisticexpialidocious.",
            "ಕನ್ನಡ ವರ್ಣಮಾಲೆ ಕಲಿಯಿರಿ. ಸ್ವರಗಳು ಮತ್ತು ವ್ಯಂಜನಗಳು.",
            "a b c d e f g",
        ];
        for input in inputs {
            for max_len in 0..60 {
                let out = summarizer.summarize_text(input, max_len);
                assert!(
                    out.chars().count() <= max_len,
                    "{:?} exceeded {} chars",
                    out,
                    max_len
                );
            }
        }
    }

    #[test]
    fn truncation_cuts_on_word_boundary() {
        assert_eq!(truncate_chars("alpha beta gamma delta", 14), "alpha beta...");
        assert_eq!(truncate_chars("short", 14), "short");
        assert_eq!(truncate_chars("abcdefgh", 4), "abcd");
    }

    #[test]
    fn mock_is_deterministic() {
        let summarizer = MockSummarizer::default();
        assert_eq!(
            summarizer.summarize_text(TEXT, 40),
            summarizer.summarize_text(TEXT, 40)
        );
    }

    #[tokio::test]
    async fn summarize_all_attaches_summaries() {
        let mut resources = vec![Resource {
            id: "r1".to_string(),
            title: "Fractions Intro".to_string(),
            size_kb: 10,
            language: crate::domain::Language::En,
            tags: ["math".to_string()].into_iter().collect(),
            url: String::new(),
            summary: Some("stale".to_string()),
        }];
        summarize_all(&MockSummarizer::default(), &mut resources, 200).await;
        let summary = resources[0].summary.as_deref().unwrap();
        assert!(summary.contains("Fractions Intro"));
        assert!(summary.chars().count() <= 200);
    }
}
