//! crates/rural_ed_core/src/settings.rs
//!
//! Explicit knobs handed to each pipeline component. Nothing here is global; callers
//! build a `PipelineSettings` (usually from the service `Config`) and pass it down.

use std::collections::BTreeSet;

use crate::qa::TemplateBank;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Resources larger than this are dropped by the catalog filter.
    pub max_size_kb: u64,
    pub sample_size: usize,
    pub seed: u64,
    pub summary_max_len: usize,
    pub top_k: usize,
    /// Number of recent interactions kept by the orchestrator.
    pub memory_size: usize,
    pub feedback_threshold: f64,
    pub stopwords: BTreeSet<String>,
    pub templates: TemplateBank,
}

const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "can", "do", "does", "explain", "for", "how", "i", "in", "is",
    "it", "me", "of", "on", "or", "tell", "the", "to", "what", "when", "where", "which", "who",
    "why", "with", "you",
];

pub fn default_stopwords() -> BTreeSet<String> {
    DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_size_kb: 1024,
            sample_size: 8,
            seed: 42,
            summary_max_len: 160,
            top_k: 3,
            memory_size: 10,
            feedback_threshold: 0.6,
            stopwords: default_stopwords(),
            templates: TemplateBank::default(),
        }
    }
}
