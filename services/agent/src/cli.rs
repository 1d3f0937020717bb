//! services/agent/src/cli.rs
//!
//! Pieces shared by the two entry points: command-line flags, logging setup and
//! the console report.

use clap::Args;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::orchestrator::Interaction;
use crate::pipeline::RunReport;

/// Flags accepted by both binaries.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Student whose session file is created or extended
    #[arg(long, default_value = "demo_student_1")]
    pub student_id: String,

    /// Seed for the reproducible catalog sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Catalog CSV to read instead of CATALOG_PATH
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long)]
    pub quiet: bool,
}

impl CommonArgs {
    /// Applies command-line overrides on top of the environment configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if self.quiet {
            config.log_level = Level::WARN;
        }
    }
}

pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Prints the run results to stdout.
pub fn print_report(report: &RunReport) {
    println!(
        "\nCatalog: {} resources loaded, {} rows skipped, {} used.",
        report.catalog_size,
        report.skipped_rows,
        report.resources.len()
    );

    println!("\nSummaries (id -> snippet):");
    for resource in &report.resources {
        println!(
            "  {}: {}",
            resource.id,
            resource.summary.as_deref().unwrap_or("")
        );
    }

    println!("\nWeekly plan:");
    for (day, id) in report.plan.lessons() {
        match report.resource(id) {
            Some(r) => println!(
                "  Day {}: {} ({} KB) - {}",
                day,
                r.title,
                r.size_kb,
                r.summary.as_deref().unwrap_or("")
            ),
            None => println!("  Day {}: {}", day, id),
        }
    }
    if !report.plan.deferred.is_empty() {
        println!("  Deferred: {}", report.plan.deferred.join(", "));
    }

    for record in &report.qa_records {
        println!("\n{}", "-".repeat(60));
        println!("Question: {}", record.question);
        println!("Answer: {}", record.answer);
        println!("Explanation: {}", record.explanation);
        for example in &record.examples {
            println!("  Example: {}", example);
        }
        for practice in &record.practice_questions {
            println!("  Practice: {}", practice);
        }
        println!("Sources: {:?}", record.source_ids);
    }

    for assessment in &report.assessments {
        println!("\n{}", "=".repeat(60));
        println!("Student answer: {}", assessment.student_answer);
        println!("Expected: {}", assessment.expected_answer);
        println!("Score: {:.2}", assessment.score);
        println!("Correct: {}", assessment.correct);
        println!("Feedback: {}", assessment.feedback);
    }

    if !report.memory.is_empty() {
        println!("\nSession memory ({} recent interactions):", report.memory.len());
        for interaction in &report.memory {
            match interaction {
                Interaction::Question(record) => println!(
                    "  Q: {} [sources: {}]",
                    record.question,
                    record.source_ids.join(", ")
                ),
                Interaction::Assessment(a) => {
                    println!("  Assessed: score {:.2}, correct {}", a.score, a.correct)
                }
            }
        }
    }

    println!(
        "\nSession for {} saved ({} Q&A records in history).",
        report.session.student_id,
        report.session.qa_history.len()
    );
}
