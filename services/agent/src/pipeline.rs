//! services/agent/src/pipeline.rs
//!
//! The end-to-end run: ingest, summarize, plan, answer questions, save the session.
//! Every stage finishes before the next starts.

use async_openai::{config::OpenAIConfig, Client};
use chrono::Utc;
use rural_ed_core::{
    catalog, domain::validate_student_id, planner, summarizer::summarize_all, Assessment,
    MockQaAgent, MockSummarizer, PortError, QARecord, QuestionAnsweringService, Resource,
    SessionDocument, SessionRepository, StudyPlan, SummarizationService,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::adapters::{OpenAiQaAdapter, OpenAiSummaryAdapter};
use crate::config::Config;
use crate::error::AgentResult;
use crate::orchestrator::{Interaction, Orchestrator};

/// Which summarizer and QA agent to wire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    Mock,
    Provider,
}

/// The summarizer and QA agent chosen at construction time.
#[derive(Clone)]
pub struct Agents {
    pub summarizer: Arc<dyn SummarizationService>,
    pub qa_agent: Arc<dyn QuestionAnsweringService>,
}

impl Agents {
    pub fn mock(config: &Config) -> Self {
        Self {
            summarizer: Arc::new(MockSummarizer::default()),
            qa_agent: Arc::new(MockQaAgent::new(config.settings.templates.clone())),
        }
    }

    /// Provider mode without an API key degrades to mock mode with a warning.
    pub fn from_config(config: &Config, mode: AgentMode) -> Self {
        if mode == AgentMode::Mock {
            return Self::mock(config);
        }
        let Some(api_key) = config.openai_api_key.as_deref() else {
            warn!("OPENAI_API_KEY is not set; using offline summarizer and QA agent.");
            return Self::mock(config);
        };

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = &config.openai_base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        let client = Client::with_config(openai_config);

        Self {
            summarizer: Arc::new(OpenAiSummaryAdapter::new(
                client.clone(),
                config.summary_model.clone(),
                config.provider_timeout,
            )),
            qa_agent: Arc::new(OpenAiQaAdapter::new(
                client,
                config.qa_model.clone(),
                config.provider_timeout,
                MockQaAgent::new(config.settings.templates.clone()),
            )),
        }
    }
}

/// Per-run inputs from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub student_id: String,
    /// Overrides the configured sampling seed.
    pub seed: Option<u64>,
    pub questions: Vec<String>,
    /// `(student_answer, expected_answer)` pairs to grade after the questions.
    pub assessments: Vec<(String, String)>,
}

/// Everything a run produced, for printing.
#[derive(Debug)]
pub struct RunReport {
    pub catalog_size: usize,
    pub skipped_rows: usize,
    pub resources: Vec<Resource>,
    pub plan: StudyPlan,
    pub qa_records: Vec<QARecord>,
    pub assessments: Vec<Assessment>,
    /// The orchestrator's bounded memory at the end of the run, oldest first.
    pub memory: Vec<Interaction>,
    pub session: SessionDocument,
}

impl RunReport {
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }
}

/// Runs ingestion, summarization, planning and Q&A, then merges the results into
/// the student's session. Fails only on setup problems: an invalid student id,
/// an unreadable catalog, or a session file that cannot be read or written.
pub async fn run_pipeline(
    config: &Config,
    agents: &Agents,
    store: &dyn SessionRepository,
    options: &RunOptions,
) -> AgentResult<RunReport> {
    validate_student_id(&options.student_id)?;
    let settings = &config.settings;
    let seed = options.seed.unwrap_or(settings.seed);

    // --- 0. Resume ---
    let stored_profile = match store.load(&options.student_id).await {
        Ok(previous) => {
            info!(
                "Resuming session for {} ({} Q&A records so far)",
                options.student_id,
                previous.qa_history.len()
            );
            previous.profile
        }
        Err(PortError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    // --- 1. Ingest ---
    let stage = Instant::now();
    info!("Reading catalog: {}", config.catalog_path.display());
    let loaded = catalog::load_from_path(&config.catalog_path)?;
    let catalog_size = loaded.resources.len();
    let skipped_rows = loaded.skipped.len();
    let within_limit = catalog::filter(
        &loaded.resources,
        settings.max_size_kb,
        None,
        &BTreeSet::new(),
    );
    let mut resources = catalog::sample(&within_limit, settings.sample_size, seed);
    info!(
        "Sampled {} of {} resources (seed {}); ingest took: {:?}",
        resources.len(),
        within_limit.len(),
        seed,
        stage.elapsed()
    );

    // --- 2. Summarize ---
    let stage = Instant::now();
    summarize_all(
        agents.summarizer.as_ref(),
        &mut resources,
        settings.summary_max_len,
    )
    .await;
    info!(
        "Summaries created for {} resources; summarize took: {:?}",
        resources.len(),
        stage.elapsed()
    );

    // --- 3. Plan ---
    let profile = stored_profile.unwrap_or_else(|| config.demo_profile(&options.student_id));
    info!(
        "Generating weekly plan for student {} (bandwidth {} KB)",
        profile.student_id, profile.weekly_bandwidth_kb
    );
    let plan = planner::build_plan(&resources, &profile);
    info!(
        "Planned {} lessons, {} deferred",
        plan.assigned_count(),
        plan.deferred.len()
    );

    // --- 4. Q&A ---
    let stage = Instant::now();
    let mut orchestrator =
        Orchestrator::new(resources.clone(), agents.qa_agent.clone(), settings);
    let mut qa_records = Vec::with_capacity(options.questions.len());
    for question in &options.questions {
        qa_records.push(orchestrator.handle_question(question).await);
    }
    let assessments: Vec<Assessment> = options
        .assessments
        .iter()
        .map(|(student, expected)| orchestrator.assess_answer(student, expected))
        .collect();
    let memory: Vec<Interaction> = orchestrator.memory().cloned().collect();
    info!("Q&A took: {:?}", stage.elapsed());

    // --- 5. Save ---
    let incoming = SessionDocument {
        student_id: options.student_id.clone(),
        profile: Some(profile),
        resources_summary: resources
            .iter()
            .filter_map(|r| r.summary.clone().map(|s| (r.id.clone(), s)))
            .collect(),
        plan: Some(plan.clone()),
        qa_history: qa_records.clone(),
        assessments: assessments.clone(),
        updated_at: Some(Utc::now()),
    };
    let session = store.save(&options.student_id, &incoming).await?;
    info!(
        "Saved session for {} ({} Q&A records in history)",
        options.student_id,
        session.qa_history.len()
    );

    Ok(RunReport {
        catalog_size,
        skipped_rows,
        resources,
        plan,
        qa_records,
        assessments,
        memory,
        session,
    })
}
