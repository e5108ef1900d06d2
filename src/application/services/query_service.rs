//! Query Service - Evidence-based questions against a world model

use std::sync::Arc;

use tracing::instrument;

use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::domain::aggregates::WorldModel;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("Failed to serialize model context: {0}")]
    Context(#[from] serde_json::Error),
    #[error("LLM error: {0}")]
    Llm(String),
}

const SYSTEM_PROMPT: &str = "You are an analyst querying an operational world model. \
Provide evidence-based answers only using the model's objects and provenance.";

pub struct QueryService<L: LlmPort> {
    llm: Arc<L>,
}

impl<L: LlmPort> QueryService<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    /// Answer a question using the model as the only context
    #[instrument(skip(self, model))]
    pub async fn query(&self, question: &str, model: &WorldModel) -> Result<String, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let context = serde_json::to_string_pretty(model)?;
        let prompt = format!(
            "Based on the following world model, answer this query: \"{}\"\n\nModel State:\n{}",
            question, context
        );

        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.3);

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| QueryError::Llm(e.to_string()))?;

        Ok(response.content.trim().to_string())
    }
}
