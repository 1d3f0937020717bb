//! crates/rural_ed_core/src/session.rs
//!
//! Merge rule for session documents, kept separate from storage so the store
//! only has to read, merge and atomically replace.

use crate::domain::SessionDocument;

/// Combines the stored document with an incoming one.
///
/// - `profile`, `plan` and `updated_at`: the incoming value wins when present.
/// - `resources_summary`: merged key by key, incoming entries overwrite.
/// - `qa_history` and `assessments`: incoming entries are appended.
///
/// `incoming` should carry only the records produced since the last save.
pub fn merge_documents(existing: Option<SessionDocument>, incoming: SessionDocument) -> SessionDocument {
    let Some(mut merged) = existing else {
        return incoming;
    };

    merged.student_id = incoming.student_id;
    if incoming.profile.is_some() {
        merged.profile = incoming.profile;
    }
    if incoming.plan.is_some() {
        merged.plan = incoming.plan;
    }
    if incoming.updated_at.is_some() {
        merged.updated_at = incoming.updated_at;
    }
    merged.resources_summary.extend(incoming.resources_summary);
    merged.qa_history.extend(incoming.qa_history);
    merged.assessments.extend(incoming.assessments);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, QARecord, StudentProfile, StudyPlan};
    use chrono::Utc;

    fn record(question: &str) -> QARecord {
        QARecord {
            question: question.to_string(),
            answer: format!("answer to {}", question),
            explanation: String::new(),
            examples: Vec::new(),
            practice_questions: Vec::new(),
            source_ids: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    fn profile(bandwidth: u64) -> StudentProfile {
        StudentProfile {
            student_id: "s1".to_string(),
            preferred_language: Language::En,
            weekly_bandwidth_kb: bandwidth,
            known_topics: Default::default(),
        }
    }

    #[test]
    fn first_save_is_taken_as_is() {
        let mut incoming = SessionDocument::new("s1");
        incoming.qa_history.push(record("q1"));
        assert_eq!(merge_documents(None, incoming.clone()), incoming);
    }

    #[test]
    fn history_appends_and_summaries_merge() {
        let mut existing = SessionDocument::new("s1");
        existing.profile = Some(profile(500));
        existing.plan = Some(StudyPlan::default());
        existing.qa_history.push(record("q1"));
        existing.resources_summary.insert("r1".into(), "old".into());
        existing.resources_summary.insert("r2".into(), "kept".into());

        let mut incoming = SessionDocument::new("s1");
        incoming.profile = Some(profile(700));
        incoming.qa_history.push(record("q2"));
        incoming.resources_summary.insert("r1".into(), "new".into());
        incoming.resources_summary.insert("r3".into(), "added".into());

        let merged = merge_documents(Some(existing), incoming);
        let questions: Vec<_> = merged.qa_history.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q2"]);
        assert_eq!(merged.profile.unwrap().weekly_bandwidth_kb, 700);
        // Absent plan in the incoming document keeps the stored one.
        assert_eq!(merged.plan, Some(StudyPlan::default()));
        assert_eq!(merged.resources_summary["r1"], "new");
        assert_eq!(merged.resources_summary["r2"], "kept");
        assert_eq!(merged.resources_summary["r3"], "added");
    }
}
