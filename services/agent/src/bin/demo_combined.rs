//! services/agent/src/bin/demo_combined.rs
//!
//! Fully offline demo: ingest, mock summaries, weekly plan, keyword Q&A, session save.

use agent_lib::{
    adapters::JsonSessionStore,
    cli::{init_tracing, print_report, CommonArgs},
    config::Config,
    error::AgentError,
    pipeline::{run_pipeline, AgentMode, Agents, RunOptions},
};
use clap::Parser;
use tracing::info;

const QUERIES: [&str; 4] = ["addition", "fractions", "kannada", "plants"];

#[derive(Parser)]
#[command(name = "demo_combined")]
#[command(about = "Run the offline study-plan and Q&A demo", long_about = None)]
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
    info!("Configuration loaded. Starting offline demo...");

    // --- 2. Wire the Mock Agents and the Session Store ---
    let agents = Agents::from_config(&config, AgentMode::Mock);
    let store = JsonSessionStore::new(config.sessions_dir.clone());

    // --- 3. Run ---
    let options = RunOptions {
        student_id: cli.common.student_id.clone(),
        seed: cli.common.seed,
        questions: QUERIES.iter().map(|q| q.to_string()).collect(),
        assessments: Vec::new(),
    };
    let report = run_pipeline(&config, &agents, &store, &options).await?;
    print_report(&report);
    println!(
        "\nDemo finished. Session saved in {}",
        config.sessions_dir.display()
    );

    Ok(())
}
