//! World Model Aggregate - The root aggregate of the typed world graph
//!
//! A world model grows only by appending extraction fragments. Appending is
//! a pure function: it validates the incoming records and returns a new
//! model, leaving the base untouched so a failed ingestion never leaves a
//! half-merged model behind.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Entity, EvidenceDocument, Observation, Relationship, WorldEvent};
use crate::domain::value_objects::{EntityId, EventId, PivotId};

/// The World Model Aggregate Root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldModel {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub events: Vec<WorldEvent>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub documents: Vec<EvidenceDocument>,
    #[serde(default)]
    pub notes: ModelNotes,
}

/// Free-text notes the extractor attaches to a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelNotes {
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub ambiguities: Vec<String>,
    #[serde(default)]
    pub unmodeled_fields: Vec<String>,
}

impl ModelNotes {
    /// Concatenate two note sets, keeping the first occurrence of each string
    pub fn merged(&self, other: &ModelNotes) -> ModelNotes {
        ModelNotes {
            assumptions: dedup_concat(&self.assumptions, &other.assumptions),
            ambiguities: dedup_concat(&self.ambiguities, &other.ambiguities),
            unmodeled_fields: dedup_concat(&self.unmodeled_fields, &other.unmodeled_fields),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assumptions.is_empty() && self.ambiguities.is_empty() && self.unmodeled_fields.is_empty()
    }
}

fn dedup_concat(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|note| seen.insert(note.as_str()))
        .cloned()
        .collect()
}

/// Which collection a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Entity,
    Event,
    Relationship,
    Observation,
    Document,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Entity => write!(f, "entity"),
            RecordKind::Event => write!(f, "event"),
            RecordKind::Relationship => write!(f, "relationship"),
            RecordKind::Observation => write!(f, "observation"),
            RecordKind::Document => write!(f, "document"),
        }
    }
}

/// Errors that can occur when appending to the aggregate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppendError {
    /// An incoming id collides with an existing record in the same branch scope
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: RecordKind, id: String },
    /// An incoming record violates a schema invariant
    #[error("invalid {kind} {id}: {reason}")]
    InvalidRecord {
        kind: RecordKind,
        id: String,
        reason: String,
    },
}

/// Counts of each collection in a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub entities: usize,
    pub events: usize,
    pub relationships: usize,
    pub observations: usize,
    pub documents: usize,
    /// Entities and events contributed by pivot overlays
    pub branched_records: usize,
}

/// A reference to an entity id that does not exist in the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub kind: RecordKind,
    /// Id of the record holding the reference
    pub holder_id: String,
    /// Which field holds it (`participant_refs`, `location_ref`, ...)
    pub field: &'static str,
    pub missing_entity_id: EntityId,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} references unknown entity {} in {}",
            self.kind, self.holder_id, self.missing_entity_id, self.field
        )
    }
}

impl WorldModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Finders
    // ========================================================================

    /// Find an entity by id; overlay records shadowing a base id are found
    /// after the base record
    pub fn find_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.entity_id == id)
    }

    pub fn find_event(&self, id: &EventId) -> Option<&WorldEvent> {
        self.events.iter().find(|e| &e.event_id == id)
    }

    /// Relationships touching the entity in either direction
    pub fn relationships_for<'a>(
        &'a self,
        entity_id: &'a EntityId,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.involves(entity_id))
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.events.is_empty()
            && self.relationships.is_empty()
            && self.observations.is_empty()
            && self.documents.is_empty()
            && self.notes.is_empty()
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            entities: self.entities.len(),
            events: self.events.len(),
            relationships: self.relationships.len(),
            observations: self.observations.len(),
            documents: self.documents.len(),
            branched_records: self.entities.iter().filter(|e| e.is_branched()).count()
                + self.events.iter().filter(|e| e.is_branched()).count(),
        }
    }

    /// Every entity reference that does not resolve
    ///
    /// Dangling references are tolerated in the model; this only reports them.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let known: HashSet<&EntityId> = self.entities.iter().map(|e| &e.entity_id).collect();
        let mut dangling = Vec::new();
        let mut check = |kind, holder_id: &str, field, id: &EntityId| {
            if !known.contains(id) {
                dangling.push(DanglingReference {
                    kind,
                    holder_id: holder_id.to_string(),
                    field,
                    missing_entity_id: id.clone(),
                });
            }
        };

        for event in &self.events {
            for participant in &event.participant_refs {
                check(RecordKind::Event, event.event_id.as_str(), "participant_refs", &participant.entity_id);
            }
            if let Some(location_ref) = &event.location_ref {
                check(RecordKind::Event, event.event_id.as_str(), "location_ref", location_ref);
            }
        }
        for rel in &self.relationships {
            check(RecordKind::Relationship, rel.relationship_id.as_str(), "from_entity_id", &rel.from_entity_id);
            check(RecordKind::Relationship, rel.relationship_id.as_str(), "to_entity_id", &rel.to_entity_id);
        }
        for obs in &self.observations {
            check(RecordKind::Observation, obs.observation_id.as_str(), "subject_ref", &obs.subject_ref);
        }
        dangling
    }

    // ========================================================================
    // Append
    // ========================================================================

    /// Append an incoming fragment, returning the grown model
    ///
    /// # Invariants
    /// - Every incoming record passes its schema validation
    /// - Incoming records belong to base reality: a `branch_id` is only
    ///   stamped by the branch registry, never appended
    /// - An incoming id may not collide with an existing id in the same
    ///   branch scope
    /// - Notes are concatenated with duplicates removed
    pub fn append(&self, incoming: &WorldModel) -> Result<WorldModel, AppendError> {
        for entity in &incoming.entities {
            let id = entity.entity_id.as_str();
            entity
                .validate()
                .map_err(|reason| invalid(RecordKind::Entity, id, reason))?;
            reject_branch(RecordKind::Entity, id, entity.branch_id.as_ref())?;
        }
        for event in &incoming.events {
            let id = event.event_id.as_str();
            event
                .validate()
                .map_err(|reason| invalid(RecordKind::Event, id, reason))?;
            reject_branch(RecordKind::Event, id, event.branch_id.as_ref())?;
        }
        for rel in &incoming.relationships {
            rel.validate().map_err(|reason| {
                invalid(RecordKind::Relationship, rel.relationship_id.as_str(), reason)
            })?;
        }
        for doc in &incoming.documents {
            doc.validate()
                .map_err(|reason| invalid(RecordKind::Document, doc.document_id.as_str(), reason))?;
        }

        check_scoped_ids(
            RecordKind::Entity,
            self.entities.iter().chain(&incoming.entities),
            |e| (&e.entity_id, e.branch_id.as_ref()),
        )?;
        check_scoped_ids(
            RecordKind::Event,
            self.events.iter().chain(&incoming.events),
            |e| (&e.event_id, e.branch_id.as_ref()),
        )?;
        check_scoped_ids(
            RecordKind::Relationship,
            self.relationships.iter().chain(&incoming.relationships),
            |r| (&r.relationship_id, None),
        )?;
        check_scoped_ids(
            RecordKind::Observation,
            self.observations.iter().chain(&incoming.observations),
            |o| (&o.observation_id, None),
        )?;
        check_scoped_ids(
            RecordKind::Document,
            self.documents.iter().chain(&incoming.documents),
            |d| (&d.document_id, None),
        )?;

        Ok(WorldModel {
            entities: concat(&self.entities, &incoming.entities),
            events: concat(&self.events, &incoming.events),
            relationships: concat(&self.relationships, &incoming.relationships),
            observations: concat(&self.observations, &incoming.observations),
            documents: concat(&self.documents, &incoming.documents),
            notes: self.notes.merged(&incoming.notes),
        })
    }
}

fn invalid(kind: RecordKind, id: &str, reason: String) -> AppendError {
    AppendError::InvalidRecord {
        kind,
        id: id.to_string(),
        reason,
    }
}

fn reject_branch(kind: RecordKind, id: &str, branch: Option<&PivotId>) -> Result<(), AppendError> {
    match branch {
        Some(pivot_id) => Err(invalid(
            kind,
            id,
            format!("base records may not carry a branch_id (found {})", pivot_id),
        )),
        None => Ok(()),
    }
}

fn concat<T: Clone>(first: &[T], second: &[T]) -> Vec<T> {
    first.iter().chain(second).cloned().collect()
}

/// Reject the first id that repeats within the same branch scope
fn check_scoped_ids<'a, T, I, Id, F>(kind: RecordKind, records: I, key: F) -> Result<(), AppendError>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    Id: Eq + Hash + std::fmt::Display + 'a,
    F: Fn(&'a T) -> (&'a Id, Option<&'a PivotId>),
{
    let mut seen = HashSet::new();
    for record in records {
        let (id, branch) = key(record);
        if !seen.insert((id, branch)) {
            return Err(AppendError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
