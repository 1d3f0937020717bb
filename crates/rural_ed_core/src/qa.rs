//! crates/rural_ed_core/src/qa.rs
//!
//! The offline question-answering agent and its template bank.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{QARecord, Resource};
use crate::ports::QuestionAnsweringService;
use crate::retriever::normalized_words;

pub const NO_MATERIAL_ANSWER: &str =
    "I couldn't find relevant material. Can you rephrase or add detail?";

/// Coarse question type, sniffed from keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    What,
    How,
    Why,
    General,
}

impl QuestionKind {
    pub fn detect(question: &str) -> Self {
        let words: Vec<String> = normalized_words(question).collect();
        let has = |word: &str| words.iter().any(|w| w == word);
        if has("why") {
            QuestionKind::Why
        } else if has("how") || has("explain") {
            QuestionKind::How
        } else if has("what") || has("define") {
            QuestionKind::What
        } else {
            QuestionKind::General
        }
    }
}

/// Templates for one question kind. `{question}`, `{topic}` and `{answer}`
/// are substituted.
#[derive(Debug, Clone)]
pub struct KindTemplates {
    pub explanation: String,
    pub practice: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateBank {
    pub what: KindTemplates,
    pub how: KindTemplates,
    pub why: KindTemplates,
    pub general: KindTemplates,
    pub examples: Vec<String>,
}

impl TemplateBank {
    pub fn for_kind(&self, kind: QuestionKind) -> &KindTemplates {
        match kind {
            QuestionKind::What => &self.what,
            QuestionKind::How => &self.how,
            QuestionKind::Why => &self.why,
            QuestionKind::General => &self.general,
        }
    }
}

fn templates(explanation: &str, practice: &[&str]) -> KindTemplates {
    KindTemplates {
        explanation: explanation.to_string(),
        practice: practice.iter().map(|p| p.to_string()).collect(),
    }
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self {
            what: templates(
                "Step-by-step: to understand '{question}', first recall the definition from {topic}, then look at one worked example. {answer}",
                &[
                    "In your own words, what is meant by {question}?",
                    "Give one everyday example related to {question}.",
                ],
            ),
            how: templates(
                "Step-by-step: to approach '{question}', first recall the basics from {topic}, then follow the worked steps in order. {answer}",
                &[
                    "Solve a basic problem related to {question} (easy).",
                    "Solve a slightly harder problem related to {question} (medium).",
                ],
            ),
            why: templates(
                "Step-by-step: to see why '{question}', start from what {topic} says and connect each cause to its effect. {answer}",
                &["Explain the reason behind {question} to a friend in two sentences."],
            ),
            general: templates(
                "Step-by-step: review {topic}, note the key ideas, then try the practice below. {answer}",
                &["Write down two things you learned about {question}."],
            ),
            examples: vec![
                "Example 1: A simple variant of {question}. Solution outline: ...".to_string(),
                "Example 2: Another practice on {question}. Solution outline: ...".to_string(),
            ],
        }
    }
}

fn fill(template: &str, question: &str, topic: &str, answer: &str) -> String {
    template
        .replace("{question}", question)
        .replace("{topic}", topic)
        .replace("{answer}", answer)
}

/// Deterministic, offline QA agent. Everything except the timestamp depends only
/// on its inputs.
#[derive(Debug, Clone, Default)]
pub struct MockQaAgent {
    templates: TemplateBank,
}

impl MockQaAgent {
    pub fn new(templates: TemplateBank) -> Self {
        Self { templates }
    }

    pub fn build_record(&self, question: &str, supporting: &[Resource]) -> QARecord {
        let question = question.trim();
        let kind = QuestionKind::detect(question);
        let kind_templates = self.templates.for_kind(kind);

        let (answer, topic) = match supporting.first() {
            Some(top) => {
                let detail = top
                    .summary
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("See the resource for details.");
                (
                    format!("Short answer (based on {}): {}", top.title, detail),
                    format!("'{}'", top.title),
                )
            }
            None => (NO_MATERIAL_ANSWER.to_string(), "your notes".to_string()),
        };

        let explanation = fill(&kind_templates.explanation, question, &topic, &answer);
        let examples = if supporting.is_empty() {
            Vec::new()
        } else {
            self.templates
                .examples
                .iter()
                .map(|t| fill(t, question, &topic, &answer))
                .collect()
        };
        let practice_questions = kind_templates
            .practice
            .iter()
            .take(2)
            .map(|t| fill(t, question, &topic, &answer))
            .collect();

        QARecord {
            question: question.to_string(),
            answer,
            explanation,
            examples,
            practice_questions,
            source_ids: supporting.iter().map(|r| r.id.clone()).collect(),
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl QuestionAnsweringService for MockQaAgent {
    async fn answer(&self, question: &str, supporting: &[Resource]) -> QARecord {
        self.build_record(question, supporting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Language;

    fn fractions() -> Resource {
        Resource {
            id: "r1".to_string(),
            title: "Fractions Intro".to_string(),
            size_kb: 12,
            language: Language::En,
            tags: ["math".to_string()].into_iter().collect(),
            url: String::new(),
            summary: Some("Fractions are parts of a whole.".to_string()),
        }
    }

    #[test]
    fn detects_question_kind() {
        assert_eq!(QuestionKind::detect("What are fractions?"), QuestionKind::What);
        assert_eq!(QuestionKind::detect("how do I add?"), QuestionKind::How);
        assert_eq!(QuestionKind::detect("Explain kannada alphabets"), QuestionKind::How);
        assert_eq!(QuestionKind::detect("Why do plants need light"), QuestionKind::Why);
        assert_eq!(QuestionKind::detect("fractions"), QuestionKind::General);
        assert_eq!(QuestionKind::detect("somewhat unclear"), QuestionKind::General);
    }

    #[test]
    fn answer_references_top_resource() {
        let record = MockQaAgent::default().build_record("what are fractions?", &[fractions()]);
        assert_eq!(
            record.answer,
            "Short answer (based on Fractions Intro): Fractions are parts of a whole."
        );
        assert!(record.explanation.contains("'Fractions Intro'"));
        assert_eq!(record.examples.len(), 2);
        assert!((1..=2).contains(&record.practice_questions.len()));
        assert_eq!(record.source_ids, vec!["r1"]);
    }

    #[test]
    fn empty_support_gives_canned_answer() {
        let record = MockQaAgent::default().build_record("foo bar baz", &[]);
        assert_eq!(record.answer, NO_MATERIAL_ANSWER);
        assert!(record.examples.is_empty());
        assert_eq!(record.practice_questions.len(), 1);
        assert!(record.source_ids.is_empty());
    }

    #[test]
    fn content_is_deterministic() {
        let agent = MockQaAgent::default();
        let a = agent.build_record("why do plants grow", &[fractions()]);
        let b = agent.build_record("why do plants grow", &[fractions()]);
        assert_eq!(
            (a.answer, a.explanation, a.examples, a.practice_questions),
            (b.answer, b.explanation, b.examples, b.practice_questions)
        );
    }
}
