//! End-to-end runs of the offline pipeline against a temporary catalog and
//! sessions directory.

use agent_lib::{
    adapters::JsonSessionStore,
    config::Config,
    error::AgentError,
    orchestrator::Interaction,
    pipeline::{run_pipeline, AgentMode, Agents, RunOptions},
};
use rural_ed_core::{
    CatalogError, Language, PortError, SessionDocument, SessionRepository, StudentProfile,
};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

const CATALOG: &str = "\
id,title,size_kb,language,url,tags
r1,Fractions Intro,100,en,u1,math;fractions
r2,Addition Basics,200,en,u2,math;addition
r3,Plants Around Us,150,hi,u3,science;plants
r4,Geometry Shapes,300,en,u4,math;geometry
r5,Kannada Alphabets,50,kn,u5,kannada;language
r6,Broken Row,lots,en,u6,math
";

fn config_for(dir: &Path, extra: &[(&str, &str)]) -> Config {
    let catalog_path = dir.join("resources.csv");
    std::fs::write(&catalog_path, CATALOG).unwrap();

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("CATALOG_PATH".into(), catalog_path.display().to_string());
    vars.insert("SESSIONS_DIR".into(), dir.join("sessions").display().to_string());
    vars.insert("DEFAULT_LANGUAGE".into(), "en".into());
    vars.insert("DEFAULT_WEEKLY_BANDWIDTH_KB".into(), "3500".into());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn options(student_id: &str, questions: &[&str]) -> RunOptions {
    RunOptions {
        student_id: student_id.to_string(),
        seed: Some(7),
        questions: questions.iter().map(|q| q.to_string()).collect(),
        assessments: vec![(
            "Fractions are parts of a whole.".to_string(),
            "Fractions represent parts of a whole number.".to_string(),
        )],
    }
}

#[tokio::test]
async fn offline_run_produces_plan_answers_and_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[]);
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    let report = run_pipeline(
        &config,
        &agents,
        &store,
        &options("student_1", &["what are fractions?", "foo bar baz"]),
    )
    .await
    .unwrap();

    assert_eq!(report.catalog_size, 5);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.resources.len(), 5);
    assert!(report.resources.iter().all(|r| r.summary.is_some()));

    // Every resource is placed exactly once (500 KB per day covers each).
    let placed: BTreeSet<_> = report.plan.lessons().map(|(_, id)| id.to_string()).collect();
    assert_eq!(placed.len(), 5);
    assert!(report.plan.deferred.is_empty());

    assert_eq!(report.qa_records.len(), 2);
    assert_eq!(report.qa_records[0].source_ids.first().map(String::as_str), Some("r1"));
    assert!(report.qa_records[1].source_ids.is_empty());
    assert!(report.assessments[0].correct);

    assert_eq!(report.memory.len(), 3);
    assert!(matches!(&report.memory[0], Interaction::Question(r) if r.question == "what are fractions?"));
    assert!(matches!(&report.memory[2], Interaction::Assessment(a) if a.correct));

    let stored = store.load("student_1").await.unwrap();
    assert_eq!(stored, report.session);
    assert_eq!(stored.resources_summary.len(), 5);
    assert_eq!(stored.assessments.len(), 1);
}

#[tokio::test]
async fn repeated_runs_are_deterministic_and_accumulate_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[("SAMPLE_SIZE", "3")]);
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());
    let opts = options("student_2", &["plants"]);

    let first = run_pipeline(&config, &agents, &store, &opts).await.unwrap();
    let second = run_pipeline(&config, &agents, &store, &opts).await.unwrap();

    assert_eq!(first.resources, second.resources);
    assert_eq!(first.plan, second.plan);
    assert_eq!(first.resources.len(), 3);
    assert_eq!(second.session.qa_history.len(), 2);
    assert_eq!(second.session.assessments.len(), 2);
}

#[tokio::test]
async fn provider_mode_without_key_runs_offline() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[]);
    assert!(config.openai_api_key.is_none());
    let agents = Agents::from_config(&config, AgentMode::Provider);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    let report = run_pipeline(&config, &agents, &store, &options("student_3", &["fractions"]))
        .await
        .unwrap();
    assert!(report.qa_records[0].answer.starts_with("Short answer (based on"));
}

#[tokio::test]
async fn missing_catalog_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), &[]);
    config.catalog_path = dir.path().join("missing.csv");
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    let result = run_pipeline(&config, &agents, &store, &options("student_4", &[])).await;
    assert!(matches!(
        result,
        Err(AgentError::Catalog(CatalogError::Io { .. }))
    ));
    assert!(!store.path_for("student_4").exists());
}

#[tokio::test]
async fn invalid_student_id_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[]);
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    let result = run_pipeline(&config, &agents, &store, &options("bad id!", &[])).await;
    assert!(matches!(
        result,
        Err(AgentError::Port(PortError::InvalidInput(_)))
    ));
}

#[tokio::test]
async fn stored_profile_seeds_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[]);
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    let mut previous = SessionDocument::new("student_6");
    previous.profile = Some(StudentProfile {
        student_id: "student_6".to_string(),
        preferred_language: Language::Kn,
        weekly_bandwidth_kb: 70,
        known_topics: Default::default(),
    });
    store.save("student_6", &previous).await.unwrap();

    let report = run_pipeline(&config, &agents, &store, &options("student_6", &[]))
        .await
        .unwrap();

    // 10 KB a day fits none of the sampled resources.
    assert_eq!(report.plan.assigned_count(), 0);
    assert_eq!(report.plan.deferred.len(), 5);
    let profile = report.session.profile.unwrap();
    assert_eq!(profile.weekly_bandwidth_kb, 70);
    assert_eq!(profile.preferred_language, Language::Kn);
}

#[tokio::test]
async fn corrupt_session_aborts_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[]);
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());
    std::fs::create_dir_all(&config.sessions_dir).unwrap();
    let path = store.path_for("student_7");
    std::fs::write(&path, "{ not json").unwrap();

    let result = run_pipeline(&config, &agents, &store, &options("student_7", &["fractions"])).await;
    assert!(matches!(
        result,
        Err(AgentError::Port(PortError::Unexpected(_)))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}
