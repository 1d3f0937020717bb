//! crates/rural_ed_core/src/domain.rs
//!
//! Defines the core data structures for the study pipeline: catalog resources,
//! student profiles, weekly plans, Q&A records and the per-student session document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ports::{PortError, PortResult};

//=========================================================================================
// Language
//=========================================================================================

/// The language a resource is written in, or a student prefers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    En,
    Hi,
    Kn,
    Other(String),
}

impl Language {
    pub fn code(&self) -> &str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Kn => "kn",
            Language::Other(code) => code,
        }
    }

    /// Parses a language filter value. `"any"` (or an empty string) means no filter.
    pub fn parse_filter(value: &str) -> Option<Language> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            None
        } else {
            Some(Language::from(trimmed))
        }
    }

    /// Naive script-based detection: Kannada block, then Devanagari, else English.
    pub fn detect(text: &str) -> Language {
        if text.chars().any(|ch| ('\u{0C80}'..='\u{0CFF}').contains(&ch)) {
            return Language::Kn;
        }
        if text.chars().any(|ch| ('\u{0900}'..='\u{097F}').contains(&ch)) {
            return Language::Hi;
        }
        Language::En
    }
}

impl From<&str> for Language {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "en" => Language::En,
            "hi" => Language::Hi,
            "kn" => Language::Kn,
            other => Language::Other(other.to_string()),
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Language::from(value.as_str())
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

//=========================================================================================
// Catalog Resources
//=========================================================================================

/// A single learning resource from the catalog.
///
/// Everything except `summary` is fixed at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub size_kb: u64,
    pub language: Language,
    pub tags: BTreeSet<String>,
    pub url: String,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Resource {
    /// The text handed to a summarizer. Title and tags lead so their keywords
    /// survive into the summary the retriever searches.
    pub fn summary_source_text(&self) -> String {
        let tags = self.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        format!(
            "{} covers {}, with explanation, examples, and practice tasks. Example content for resource {}.",
            self.title, tags, self.id
        )
    }

    pub fn has_any_topic(&self, topics: &BTreeSet<String>) -> bool {
        topics.iter().any(|t| self.tags.contains(t))
    }
}

//=========================================================================================
// Student Profile & Study Plan
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: String,
    pub preferred_language: Language,
    pub weekly_bandwidth_kb: u64,
    #[serde(default)]
    pub known_topics: BTreeSet<String>,
}

/// One day of the weekly plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day_index: usize,
    #[serde(default)]
    pub budget_kb: u64,
    #[serde(default)]
    pub assigned_resources: Vec<String>,
    #[serde(default)]
    pub cumulative_size_kb: u64,
}

impl DayPlan {
    pub fn remaining_kb(&self) -> u64 {
        self.budget_kb.saturating_sub(self.cumulative_size_kb)
    }
}

/// Seven ordered day buckets plus the resources that fit nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudyPlan {
    #[serde(default)]
    pub days: Vec<DayPlan>,
    #[serde(default)]
    pub deferred: Vec<String>,
}

impl StudyPlan {
    /// Every assigned resource id paired with its (1-based) day number.
    pub fn lessons(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.days.iter().flat_map(|day| {
            day.assigned_resources
                .iter()
                .map(move |id| (day.day_index + 1, id.as_str()))
        })
    }

    pub fn assigned_count(&self) -> usize {
        self.days.iter().map(|d| d.assigned_resources.len()).sum()
    }
}

//=========================================================================================
// Q&A and Feedback Records
//=========================================================================================

/// The outcome of one question-and-answer exchange. Appended to history, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QARecord {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub practice_questions: Vec<String>,
    #[serde(default)]
    pub source_ids: Vec<String>,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

/// A graded student answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub student_answer: String,
    pub expected_answer: String,
    pub score: f64,
    pub correct: bool,
    pub feedback: String,
}

//=========================================================================================
// Session Document
//=========================================================================================

/// The persisted state of one student, stored as `<sessions-dir>/<student_id>.json`.
///
/// Every field has a default so older or partial files still load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub profile: Option<StudentProfile>,
    #[serde(default)]
    pub resources_summary: BTreeMap<String, String>,
    #[serde(default)]
    pub plan: Option<StudyPlan>,
    #[serde(default)]
    pub qa_history: Vec<QARecord>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionDocument {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            ..Self::default()
        }
    }
}

/// Student ids become file names, so only `[A-Za-z0-9_-]{1,64}` is accepted.
pub fn validate_student_id(student_id: &str) -> PortResult<()> {
    let valid = !student_id.is_empty()
        && student_id.len() <= 64
        && student_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PortError::InvalidInput(format!(
            "invalid student id '{}'",
            student_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_round_trips_through_its_code() {
        assert_eq!(Language::from("EN"), Language::En);
        assert_eq!(Language::from("ta"), Language::Other("ta".to_string()));
        assert_eq!(String::from(Language::Kn), "kn");
        assert_eq!(Language::parse_filter("any"), None);
        assert_eq!(Language::parse_filter(" hi "), Some(Language::Hi));
    }

    #[test]
    fn detects_language_by_script() {
        assert_eq!(Language::detect("ಕನ್ನಡ ವರ್ಣಮಾಲೆ"), Language::Kn);
        assert_eq!(Language::detect("हिंदी वर्णमाला"), Language::Hi);
        assert_eq!(Language::detect("Fractions"), Language::En);
    }

    #[test]
    fn student_id_validation() {
        assert!(validate_student_id("demo_student-1").is_ok());
        assert!(validate_student_id("").is_err());
        assert!(validate_student_id("../etc/passwd").is_err());
        assert!(validate_student_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn session_document_tolerates_missing_fields() {
        let doc: SessionDocument = serde_json::from_str(r#"{"student_id":"s1"}"#).unwrap();
        assert_eq!(doc.student_id, "s1");
        assert!(doc.qa_history.is_empty());
        assert!(doc.plan.is_none());
    }
}
