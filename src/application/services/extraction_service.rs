//! Extraction Service
//!
//! Turns unstructured text into a world-model fragment by asking the LLM to
//! fill the fixed ontology and parsing its JSON answer.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::domain::aggregates::{ModelNotes, WorldModel};

/// Inputs shorter than this (non-whitespace characters) are rejected
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Insufficient content: {actual} characters, at least {required} required")]
    InsufficientContent { actual: usize, required: usize },
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("Schema error: {0}")]
    Schema(String),
}

pub struct ExtractionService<L: LlmPort> {
    llm: Arc<L>,
    min_content_chars: usize,
}

impl<L: LlmPort> ExtractionService<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
        }
    }

    pub fn with_min_content_chars(mut self, min_content_chars: usize) -> Self {
        self.min_content_chars = min_content_chars;
        self
    }

    /// Extract a world-model fragment from raw text
    ///
    /// The fragment is not validated against any existing model here; that
    /// happens when it is appended.
    #[instrument(skip(self, raw_text), fields(chars = raw_text.len()))]
    pub async fn extract(&self, raw_text: &str) -> Result<WorldModel, ExtractionError> {
        let actual = raw_text.chars().filter(|c| !c.is_whitespace()).count();
        if actual < self.min_content_chars {
            return Err(ExtractionError::InsufficientContent {
                actual,
                required: self.min_content_chars,
            });
        }

        let request = LlmRequest::new(vec![ChatMessage::user(build_user_prompt(raw_text))])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.1)
            .with_json_response();

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| ExtractionError::Llm(e.to_string()))?;

        let mut fragment = parse_fragment(&response.content)?;

        let dangling: Vec<String> = fragment
            .dangling_references()
            .iter()
            .map(ToString::to_string)
            .collect();
        if !dangling.is_empty() {
            warn!(count = dangling.len(), "Extracted fragment has dangling references");
            fragment.notes = fragment.notes.merged(&ModelNotes {
                ambiguities: dangling,
                ..Default::default()
            });
        }

        debug!(stats = ?fragment.stats(), "Extracted fragment");
        Ok(fragment)
    }
}

const SYSTEM_PROMPT: &str = r#"You are a World Modeling Engine.
Your job is to transform data into a unified operational world model using a fixed ontology.
You do NOT summarize. You do NOT invent facts. You do NOT assume meaning without evidence.

ONTOLOGY:
1) Entity: persistent things (Person, Organization, Location, Asset, Product, System, Landmass).
   Fields: entity_id, entity_type, names[], attributes{}, valid_time, location, source_refs[].
2) Event: occurrences (Transaction, Shipment, Meeting, Incident, Performance).
   Fields: event_id, event_type, time_interval{instant|start,end}, location, location_ref,
   participant_refs[{entity_id, role}], inputs[], outputs[], effects[], source_refs[].
3) Relationship: time-bounded connection between two entities (Employment, Ownership, ...).
   Fields: relationship_id, relationship_type, from_entity_id, to_entity_id, valid_time,
   confidence (0..1), source_refs[].
4) Observation: measurements tied to a subject.
   Fields: observation_id, subject_ref, metric_name, value, unit, observation_time,
   uncertainty, source_refs[].
5) Document: raw source material.
   Fields: document_id, document_type, content_ref, extracted_refs[],
   provenance{origin, timestamp}, credibility (0..1).

Times are literals such as "1760", "500 BCE", "-66 Ma", "-4.54 Ga" or ISO dates.
Locations are {"type": "Point", "coordinates": [x, y]} or
{"type": "Polygon", "coordinates": [[x, y], ...]}.

Return one JSON object with the keys entities, events, relationships, observations,
documents and notes{assumptions[], ambiguities[], unmodeled_fields[]}.
STRICT JSON OUTPUT REQUIRED."#;

fn build_user_prompt(raw_text: &str) -> String {
    format!("Transform this data into the world model ontology:\n\n{}", raw_text)
}

/// Parse the LLM answer, tolerating a surrounding markdown code fence
fn parse_fragment(content: &str) -> Result<WorldModel, ExtractionError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ExtractionError::Schema(e.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
