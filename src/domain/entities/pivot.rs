//! Pivot - A named hypothetical divergence from base reality

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Entity, WorldEvent};
use crate::domain::value_objects::PivotId;

/// A hypothetical divergence with a precomputed overlay of entities and events
///
/// `expected_impact` is a free-form severity tag ("HIGH", "EXTREME", ...)
/// that the engine passes through without interpreting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub pivot_id: PivotId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_impact: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub events: Vec<WorldEvent>,
}

impl Pivot {
    pub fn new(pivot_id: impl Into<PivotId>, name: impl Into<String>) -> Self {
        Self {
            pivot_id: pivot_id.into(),
            name: name.into(),
            description: String::new(),
            expected_impact: String::new(),
            entities: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_impact(mut self, expected_impact: impl Into<String>) -> Self {
        self.expected_impact = expected_impact.into();
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_event(mut self, event: WorldEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Stamp every overlay record with this pivot's id
    pub fn tagged(mut self) -> Self {
        let pivot_id = &self.pivot_id;
        self.entities = self
            .entities
            .into_iter()
            .map(|entity| entity.with_branch(pivot_id.clone()))
            .collect();
        self.events = self
            .events
            .into_iter()
            .map(|event| event.with_branch(pivot_id.clone()))
            .collect();
        self
    }

    pub fn summary(&self) -> PivotSummary {
        PivotSummary {
            pivot_id: self.pivot_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            expected_impact: self.expected_impact.clone(),
            entity_count: self.entities.len(),
            event_count: self.events.len(),
        }
    }
}

/// Catalog listing of a pivot without its overlay records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSummary {
    pub pivot_id: PivotId,
    pub name: String,
    pub description: String,
    pub expected_impact: String,
    pub entity_count: usize,
    pub event_count: usize,
}
