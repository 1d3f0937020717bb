//! services/agent/src/orchestrator.rs
//!
//! Routes a student's question through the retriever and then the QA agent, and
//! keeps a short bounded memory of recent interactions.

use rural_ed_core::{
    Assessment, FeedbackAgent, PipelineSettings, QARecord, QuestionAnsweringService, Resource,
    RetrieverAgent,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// One remembered interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Question(QARecord),
    Assessment(Assessment),
}

pub struct Orchestrator {
    catalog: Vec<Resource>,
    retriever: RetrieverAgent,
    qa_agent: Arc<dyn QuestionAnsweringService>,
    feedback_agent: FeedbackAgent,
    top_k: usize,
    memory_size: usize,
    memory: VecDeque<Interaction>,
}

impl Orchestrator {
    pub fn new(
        catalog: Vec<Resource>,
        qa_agent: Arc<dyn QuestionAnsweringService>,
        settings: &PipelineSettings,
    ) -> Self {
        Self {
            catalog,
            retriever: RetrieverAgent::new(settings.stopwords.clone()),
            qa_agent,
            feedback_agent: FeedbackAgent::new(settings.feedback_threshold),
            top_k: settings.top_k,
            memory_size: settings.memory_size,
            memory: VecDeque::new(),
        }
    }

    fn remember(&mut self, interaction: Interaction) {
        self.memory.push_back(interaction);
        while self.memory.len() > self.memory_size {
            self.memory.pop_front();
        }
    }

    /// Retrieves supporting resources, then asks the QA agent. Never fails: an
    /// empty retrieval simply yields the agent's no-material answer.
    pub async fn handle_question(&mut self, question: &str) -> QARecord {
        let start = Instant::now();
        let supporting = self.retriever.retrieve(question, &self.catalog, self.top_k);
        info!(
            "Retriever returned {} resources for '{}'",
            supporting.len(),
            question
        );

        let record = self.qa_agent.answer(question, &supporting).await;
        info!("Answered '{}' in {:?}", question, start.elapsed());
        self.remember(Interaction::Question(record.clone()));
        record
    }

    pub fn assess_answer(&mut self, student_answer: &str, expected_answer: &str) -> Assessment {
        let assessment = self.feedback_agent.assess(student_answer, expected_answer);
        info!(
            "Assessed student answer: score {:.2}, correct {}",
            assessment.score, assessment.correct
        );
        self.remember(Interaction::Assessment(assessment.clone()));
        assessment
    }

    pub fn memory(&self) -> impl Iterator<Item = &Interaction> {
        self.memory.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rural_ed_core::{Language, MockQaAgent};

    fn catalog() -> Vec<Resource> {
        vec![Resource {
            id: "r1".to_string(),
            title: "Fractions Intro".to_string(),
            size_kb: 12,
            language: Language::En,
            tags: ["math".to_string(), "fractions".to_string()].into_iter().collect(),
            url: String::new(),
            summary: Some("Fractions are parts of a whole.".to_string()),
        }]
    }

    fn orchestrator(memory_size: usize) -> Orchestrator {
        let settings = PipelineSettings {
            memory_size,
            ..PipelineSettings::default()
        };
        Orchestrator::new(catalog(), Arc::new(MockQaAgent::default()), &settings)
    }

    #[tokio::test]
    async fn question_flows_through_retriever_and_agent() {
        let mut orch = orchestrator(10);
        let record = orch.handle_question("what are fractions?").await;
        assert_eq!(record.source_ids, vec!["r1"]);
        assert!(record.answer.contains("Fractions Intro"));

        let empty = orch.handle_question("foo bar baz").await;
        assert!(empty.source_ids.is_empty());
        assert_eq!(orch.memory().count(), 2);
    }

    #[tokio::test]
    async fn memory_is_bounded() {
        let mut orch = orchestrator(2);
        orch.handle_question("fractions").await;
        orch.handle_question("math").await;
        orch.assess_answer("parts of a whole", "parts of a whole");

        let remembered: Vec<_> = orch.memory().collect();
        assert_eq!(remembered.len(), 2);
        assert!(matches!(remembered[0], Interaction::Question(r) if r.question == "math"));
        assert!(matches!(remembered[1], Interaction::Assessment(a) if a.correct));
    }
}
