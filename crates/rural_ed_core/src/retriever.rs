//! crates/rural_ed_core/src/retriever.rs
//!
//! Keyword-overlap retrieval over the catalog.

use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::Resource;

/// Lower-cased words split on Unicode word boundaries. Combining marks such as
/// the Kannada and Devanagari virama stay inside their word.
pub fn normalized_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.unicode_words().map(str::to_lowercase)
}

/// Normalized words, minus stop words.
pub fn keywords(text: &str, stopwords: &BTreeSet<String>) -> BTreeSet<String> {
    normalized_words(text)
        .filter(|t| !stopwords.contains(t))
        .collect()
}

fn resource_keywords(resource: &Resource, stopwords: &BTreeSet<String>) -> BTreeSet<String> {
    let mut words = keywords(&resource.title, stopwords);
    for tag in &resource.tags {
        words.extend(keywords(tag, stopwords));
    }
    if let Some(summary) = &resource.summary {
        words.extend(keywords(summary, stopwords));
    }
    words
}

/// A retrieved resource and the number of question keywords it shares.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResource {
    pub resource: Resource,
    pub score: usize,
}

#[derive(Debug, Clone)]
pub struct RetrieverAgent {
    stopwords: BTreeSet<String>,
}

impl RetrieverAgent {
    pub fn new(stopwords: BTreeSet<String>) -> Self {
        Self { stopwords }
    }

    /// Ranks by shared keywords (descending), then size (ascending), then catalog
    /// order. Resources sharing nothing are never returned, so the result may be empty.
    pub fn retrieve_scored(
        &self,
        question: &str,
        catalog: &[Resource],
        top_k: usize,
    ) -> Vec<ScoredResource> {
        let wanted = keywords(question, &self.stopwords);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, ScoredResource)> = catalog
            .iter()
            .enumerate()
            .filter_map(|(position, resource)| {
                let score = resource_keywords(resource, &self.stopwords)
                    .intersection(&wanted)
                    .count();
                (score > 0).then(|| {
                    (
                        position,
                        ScoredResource {
                            resource: resource.clone(),
                            score,
                        },
                    )
                })
            })
            .collect();

        scored.sort_by(|(pos_a, a), (pos_b, b)| {
            b.score
                .cmp(&a.score)
                .then(a.resource.size_kb.cmp(&b.resource.size_kb))
                .then(pos_a.cmp(pos_b))
        });
        scored.into_iter().take(top_k).map(|(_, s)| s).collect()
    }

    pub fn retrieve(&self, question: &str, catalog: &[Resource], top_k: usize) -> Vec<Resource> {
        self.retrieve_scored(question, catalog, top_k)
            .into_iter()
            .map(|s| s.resource)
            .collect()
    }
}
