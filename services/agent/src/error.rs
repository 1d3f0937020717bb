//! services/agent/src/error.rs
//!
//! Defines the primary error type for the agent service.

use crate::config::ConfigError;
use rural_ed_core::{CatalogError, PortError};

/// The primary error type for the `agent` service. Only setup failures reach
/// this type; provider failures are recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// The catalog file could not be read at all.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type AgentResult<T> = Result<T, AgentError>;
