//! crates/rural_ed_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the pipeline.
//! Summarization and question answering each have a mock implementation in this
//! crate and a provider-backed one in the agent service; session persistence is
//! implemented by the service's JSON file store.

use async_trait::async_trait;

use crate::domain::{QARecord, Resource, SessionDocument};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Produces a summary of at most `max_len` characters. Never fails: provider-backed
    /// implementations fall back to the mock output.
    async fn summarize(&self, text: &str, max_len: usize) -> String;
}

#[async_trait]
pub trait QuestionAnsweringService: Send + Sync {
    /// Builds a full answer bundle for `question` from the retrieved resources.
    async fn answer(&self, question: &str, supporting: &[Resource]) -> QARecord;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads the stored document, or `PortError::NotFound` if none exists yet.
    async fn load(&self, student_id: &str) -> PortResult<SessionDocument>;

    /// Merges `document` into whatever is stored and returns the merged result.
    async fn save(&self, student_id: &str, document: &SessionDocument)
        -> PortResult<SessionDocument>;
}
