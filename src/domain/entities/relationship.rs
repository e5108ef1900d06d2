//! Relationship - Time-bounded directed edges between entities

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DocumentId, EntityId, RelationshipId};

/// A directed, time-bounded connection between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub relationship_id: RelationshipId,
    pub relationship_type: String,
    pub from_entity_id: EntityId,
    pub to_entity_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_time: Option<String>,
    /// Extraction confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub source_refs: Vec<DocumentId>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Relationship {
    pub fn new(
        relationship_id: impl Into<RelationshipId>,
        relationship_type: impl Into<String>,
        from: impl Into<EntityId>,
        to: impl Into<EntityId>,
    ) -> Self {
        Self {
            relationship_id: relationship_id.into(),
            relationship_type: relationship_type.into(),
            from_entity_id: from.into(),
            to_entity_id: to.into(),
            valid_time: None,
            confidence: default_confidence(),
            source_refs: Vec::new(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_valid_time(mut self, literal: impl Into<String>) -> Self {
        self.valid_time = Some(literal.into());
        self
    }

    /// Whether the edge touches the entity at either end
    pub fn involves(&self, entity_id: &EntityId) -> bool {
        &self.from_entity_id == entity_id || &self.to_entity_id == entity_id
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} is outside [0, 1]", self.confidence));
        }
        Ok(())
    }
}
