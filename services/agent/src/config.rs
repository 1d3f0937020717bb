//! services/agent/src/config.rs
//!
//! Defines the agent's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use rural_ed_core::{catalog::parse_tags, Language, PipelineSettings, StudentProfile};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub sessions_dir: PathBuf,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub summary_model: String,
    pub qa_model: String,
    pub provider_timeout: Duration,
    pub default_language: Language,
    pub default_weekly_bandwidth_kb: u64,
    pub default_known_topics: Vec<String>,
    pub settings: PipelineSettings,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Paths and Logging ---
        let catalog_path = PathBuf::from(var_or("CATALOG_PATH", "data/sample_resources.csv"));
        let sessions_dir = PathBuf::from(var_or("SESSIONS_DIR", "data/sessions"));

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Provider Settings (API key is optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let openai_base_url = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty());
        let summary_model = var_or("SUMMARY_MODEL", "gpt-4o-mini");
        let qa_model = var_or("QA_MODEL", "gpt-4o-mini");
        let provider_timeout =
            Duration::from_secs(parse_var(&lookup, "PROVIDER_TIMEOUT_SECS", 20u64)?);

        // --- Demo Student Defaults ---
        let default_language = Language::from(var_or("DEFAULT_LANGUAGE", "kn"));
        let default_weekly_bandwidth_kb = parse_var(&lookup, "DEFAULT_WEEKLY_BANDWIDTH_KB", 500u64)?;
        let default_known_topics = parse_tags(&var_or("DEFAULT_KNOWN_TOPICS", "math"))
            .into_iter()
            .collect();

        // --- Pipeline Knobs ---
        let defaults = PipelineSettings::default();
        let settings = PipelineSettings {
            max_size_kb: parse_var(&lookup, "MAX_RESOURCE_SIZE_KB", defaults.max_size_kb)?,
            sample_size: parse_var(&lookup, "SAMPLE_SIZE", defaults.sample_size)?,
            seed: parse_var(&lookup, "DEMO_SEED", defaults.seed)?,
            summary_max_len: parse_var(&lookup, "SUMMARY_MAX_LEN", defaults.summary_max_len)?,
            top_k: parse_var(&lookup, "RETRIEVER_TOP_K", defaults.top_k)?,
            ..defaults
        };

        Ok(Self {
            catalog_path,
            sessions_dir,
            log_level,
            openai_api_key,
            openai_base_url,
            summary_model,
            qa_model,
            provider_timeout,
            default_language,
            default_weekly_bandwidth_kb,
            default_known_topics,
            settings,
        })
    }

    /// The demo student's profile, using the configured defaults.
    pub fn demo_profile(&self, student_id: &str) -> StudentProfile {
        StudentProfile {
            student_id: student_id.to_string(),
            preferred_language: self.default_language.clone(),
            weekly_bandwidth_kb: self.default_weekly_bandwidth_kb,
            known_topics: self.default_known_topics.iter().cloned().collect(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
