//! services/agent/src/bin/real_agents.rs
//!
//! The same pipeline with provider-backed summarizer and QA agent, followed by a
//! feedback assessment. Falls back to offline behaviour when the provider is
//! unavailable.

use agent_lib::{
    adapters::JsonSessionStore,
    cli::{init_tracing, print_report, CommonArgs},
    config::Config,
    error::AgentError,
    pipeline::{run_pipeline, AgentMode, Agents, RunOptions},
};
use clap::Parser;
use tracing::info;

const QUESTIONS: [&str; 4] = [
    "what are fractions?",
    "what is addition?",
    "explain kannada alphabets",
    "what are plants?",
];

const STUDENT_ANSWER: &str = "Fractions are parts of a whole.";
const EXPECTED_ANSWER: &str = "Fractions represent parts of a whole number.";

#[derive(Parser)]
#[command(name = "real_agents")]
#[command(about = "Run the study pipeline with provider-backed agents", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AgentError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let mut config = Config::from_env()?;
    cli.common.apply(&mut config);
    init_tracing(&config);
    info!("Configuration loaded. Starting provider-backed agents...");

    // --- 2. Wire the Provider Agents and the Session Store ---
    let agents = Agents::from_config(&config, AgentMode::Provider);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    // --- 3. Run ---
    let options = RunOptions {
        student_id: cli.common.student_id.clone(),
        seed: cli.common.seed,
        questions: QUESTIONS.iter().map(|q| q.to_string()).collect(),
        assessments: vec![(STUDENT_ANSWER.to_string(), EXPECTED_ANSWER.to_string())],
    };
    let report = run_pipeline(&config, &agents, &store, &options).await?;
    print_report(&report);
    println!("\nDone. Multi-agent demo finished.");

    Ok(())
}
