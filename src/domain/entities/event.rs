//! WorldEvent - Occurrences in the world model

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DocumentId, EntityId, EventId, Geometry, PivotId};

/// Something that happened (a meeting, a shipment, a collision of plates)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub event_id: EventId,
    pub event_type: String,
    pub time_interval: TimeInterval,
    /// Explicit location of the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Geometry>,
    /// Entity whose location the event borrows when it has none of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_ref: Option<EntityId>,
    #[serde(default)]
    pub participant_refs: Vec<ParticipantRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    /// Free-text deltas, informational only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    #[serde(default)]
    pub source_refs: Vec<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<PivotId>,
}

/// When an event happened
///
/// Either an `instant`, or a `start` with an optional `end`. At least one of
/// `instant`/`start` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl TimeInterval {
    pub fn instant(literal: impl Into<String>) -> Self {
        Self {
            instant: Some(literal.into()),
            ..Self::default()
        }
    }

    pub fn span(start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            instant: None,
            start: Some(start.into()),
            end,
        }
    }

    /// The literal the event is pinned to on the timeline
    pub fn anchor(&self) -> Option<&str> {
        let present = |s: &&str| !s.trim().is_empty();
        self.instant
            .as_deref()
            .filter(present)
            .or_else(|| self.start.as_deref().filter(present))
    }
}

/// An entity taking part in an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub entity_id: EntityId,
    #[serde(default)]
    pub role: String,
}

impl WorldEvent {
    pub fn new(
        event_id: impl Into<EventId>,
        event_type: impl Into<String>,
        time_interval: TimeInterval,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            time_interval,
            location: None,
            location_ref: None,
            participant_refs: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            effects: Vec::new(),
            source_refs: Vec::new(),
            branch_id: None,
        }
    }

    pub fn with_location(mut self, location: Geometry) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_location_ref(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.location_ref = Some(entity_id.into());
        self
    }

    pub fn with_participant(mut self, entity_id: impl Into<EntityId>, role: impl Into<String>) -> Self {
        self.participant_refs.push(ParticipantRef {
            entity_id: entity_id.into(),
            role: role.into(),
        });
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    pub fn with_source(mut self, document_id: impl Into<DocumentId>) -> Self {
        self.source_refs.push(document_id.into());
        self
    }

    pub fn with_branch(mut self, pivot_id: PivotId) -> Self {
        self.branch_id = Some(pivot_id);
        self
    }

    pub fn is_branched(&self) -> bool {
        self.branch_id.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.event_id.as_str().trim().is_empty() {
            return Err("event_id cannot be empty".to_string());
        }
        if self.time_interval.anchor().is_none() {
            return Err("time_interval needs an instant or a start".to_string());
        }
        Ok(())
    }
}
