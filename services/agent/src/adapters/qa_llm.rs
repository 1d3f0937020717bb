//! services/agent/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for the main Question-Answering LLM.
//! It implements the `QuestionAnsweringService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a patient tutor for school students in rural areas who study offline with small downloaded resources.

The context you receive lists the RESOURCES retrieved for the student's question. Each resource has an id, a title, its tags and a short summary.

Your role:
- Answer the QUESTION simply and correctly, using the RESOURCES first and general knowledge only to fill small gaps.
- Explain the idea step by step, the way a teacher would at a blackboard.
- Give short worked examples.
- Write practice questions the student can try without internet access.

Respond with ONE JSON object and nothing else, using exactly these keys:
{
  "answer": "two or three sentences",
  "explanation": "a short step-by-step explanation",
  "examples": ["one or two short worked examples"],
  "practice_questions": ["one or two practice questions"]
}"#;

const USER_INPUT_TEMPLATE: &str = r#"RESOURCES:
---
{context}
---

QUESTION:
{question}"#;

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
use chrono::Utc;
use regex::Regex;
use rural_ed_core::{
    domain::{QARecord, Resource},
    ports::{PortError, PortResult, QuestionAnsweringService},
    qa::MockQaAgent,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// The JSON shape requested from the provider.
#[derive(Debug, Deserialize)]
struct ProviderAnswer {
    answer: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    practice_questions: Vec<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuestionAnsweringService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    fallback: MockQaAgent,
}

impl OpenAiQaAdapter {
    /// Creates a new `OpenAiQaAdapter`. `fallback` answers whenever the provider cannot.
    pub fn new(
        client: Client<OpenAIConfig>,
        model: String,
        timeout: Duration,
        fallback: MockQaAgent,
    ) -> Self {
        Self {
            client,
            model,
            timeout,
            fallback,
        }
    }

    fn build_context(supporting: &[Resource]) -> String {
        supporting
            .iter()
            .map(|r| {
                let tags = r.tags.iter().cloned().collect::<Vec<_>>().join(", ");
                format!(
                    "[{}] {} (tags: {})\n{}",
                    r.id,
                    r.title,
                    tags,
                    r.summary.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    async fn request_answer(&self, question: &str, supporting: &[Resource]) -> PortResult<String> {
        let user_input = USER_INPUT_TEMPLATE
            .replace("{context}", &Self::build_context(supporting))
            .replace("{question}", question);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(800u32)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!("QA request timed out after {:?}", self.timeout))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("QA LLM response contained no text content.".to_string())
            })
    }
}

/// Parses the provider's reply into a record, tolerating a markdown code fence.
pub fn parse_answer(raw: &str, question: &str, supporting: &[Resource]) -> PortResult<QARecord> {
    let fence = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$")
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    let body = fence
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw.trim(), |m| m.as_str());

    let parsed: ProviderAnswer = serde_json::from_str(body)
        .map_err(|e| PortError::Unexpected(format!("malformed QA response: {}", e)))?;
    if parsed.answer.trim().is_empty() {
        return Err(PortError::Unexpected("QA response had an empty answer".to_string()));
    }

    Ok(QARecord {
        question: question.trim().to_string(),
        answer: parsed.answer.trim().to_string(),
        explanation: parsed.explanation.trim().to_string(),
        examples: parsed.examples,
        practice_questions: parsed.practice_questions.into_iter().take(2).collect(),
        source_ids: supporting.iter().map(|r| r.id.clone()).collect(),
        timestamp: Utc::now(),
    })
}

//=========================================================================================
// `QuestionAnsweringService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionAnsweringService for OpenAiQaAdapter {
    async fn answer(&self, question: &str, supporting: &[Resource]) -> QARecord {
        if supporting.is_empty() {
            info!("No supporting resources for '{}'; answering offline.", question);
            return self.fallback.build_record(question, supporting);
        }

        let outcome = match self.request_answer(question, supporting).await {
            Ok(raw) => parse_answer(&raw, question, supporting),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(record) => record,
            Err(e) => {
                warn!("QA provider failed, using offline answer instead: {}", e);
                self.fallback.build_record(question, supporting)
            }
        }
    }
}
