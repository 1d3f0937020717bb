//! crates/rural_ed_core/src/feedback.rs
//!
//! Grades a student's short free-text answer against the expected one.

use std::collections::BTreeSet;

use crate::domain::Assessment;
use crate::retriever::normalized_words;

const CORRECT_FEEDBACK: &str = "Good! Your answer matches the expected solution closely.";
const RETRY_FEEDBACK: &str =
    "Not quite. Review the explanation and try the easier practice example.";

fn word_set(text: &str) -> BTreeSet<String> {
    normalized_words(text).collect()
}

/// Dice coefficient over the two answers' word sets, in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (word_set(a), word_set(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count() as f64;
    (2.0 * shared / (a.len() + b.len()) as f64).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct FeedbackAgent {
    threshold: f64,
}

impl FeedbackAgent {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn assess(&self, student_answer: &str, expected_answer: &str) -> Assessment {
        let score = similarity(student_answer, expected_answer);
        let correct = score >= self.threshold;
        Assessment {
            student_answer: student_answer.to_string(),
            expected_answer: expected_answer.to_string(),
            score,
            correct,
            feedback: if correct { CORRECT_FEEDBACK } else { RETRY_FEEDBACK }.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_paraphrase_is_correct() {
        let agent = FeedbackAgent::new(0.6);
        let result = agent.assess(
            "Fractions are parts of a whole.",
            "Fractions represent parts of a whole number.",
        );
        assert!(result.correct);
        assert!(result.score > 0.7 && result.score < 0.8);
        assert_eq!(result.feedback, CORRECT_FEEDBACK);
    }

    #[test]
    fn unrelated_answer_is_not_correct() {
        let result = FeedbackAgent::new(0.6).assess("Plants need sunlight", "Fractions are parts");
        assert!(!result.correct);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn empty_answers_score_zero() {
        assert_eq!(similarity("", "anything"), 0.0);
        assert_eq!(similarity("Same words", "same WORDS"), 1.0);
    }

    #[test]
    fn kannada_answers_compare_whole_words() {
        assert_eq!(similarity("ಪಕ್ಷಿ", "ಪಕ್ಕ"), 0.0);
        let result = FeedbackAgent::new(0.6).assess("ಕನ್ನಡ ನಮ್ಮ ಭಾಷೆ", "ಕನ್ನಡ ನಮ್ಮ ಭಾಷೆ");
        assert!(result.correct);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn hindi_answers_compare_whole_words() {
        assert_eq!(similarity("हिन्दी", "हिन"), 0.0);
        let result = FeedbackAgent::new(0.6).assess("भारत की राजधानी दिल्ली है", "दिल्ली भारत की राजधानी है");
        assert!(result.correct);
        assert_eq!(result.score, 1.0);
    }
}
