//! services/agent/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the summarization LLM.
//! It implements the `SummarizationService` port from the `core` crate and falls
//! back to the offline summarizer whenever the provider call fails.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use rural_ed_core::{
    ports::{PortError, PortResult, SummarizationService},
    summarizer::{truncate_chars, MockSummarizer},
};
use std::time::Duration;
use tracing::warn;

const SYSTEM_INSTRUCTIONS: &str = "You summarize learning resources for school students with limited internet access. Write one or two plain sentences that keep the topic words of the title. No lists, no markdown, no preamble.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    fallback: MockSummarizer,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
            fallback: MockSummarizer::default(),
        }
    }

    async fn request_summary(&self, text: &str, max_len: usize) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Summarize in at most {} characters:\n\n{}",
                    max_len, text
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(token_budget(max_len))
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!("summary request timed out after {:?}", self.timeout))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                PortError::Unexpected("Summary LLM response contained no text content.".to_string())
            })
    }
}

/// Roughly three characters per token, with a floor so short limits still get a sentence.
fn token_budget(max_len: usize) -> u32 {
    u32::try_from(max_len / 3).unwrap_or(u32::MAX).max(16)
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    async fn summarize(&self, text: &str, max_len: usize) -> String {
        match self.request_summary(text, max_len).await {
            Ok(summary) => truncate_chars(&summary, max_len),
            Err(e) => {
                warn!("Summary provider failed, using offline summary instead: {}", e);
                self.fallback.summarize_text(text, max_len)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_budget_has_a_floor() {
        assert_eq!(token_budget(0), 16);
        assert_eq!(token_budget(300), 100);
    }
}
