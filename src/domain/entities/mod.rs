//! Domain entities - Records of the world model graph

mod document;
mod entity;
mod event;
mod observation;
mod pivot;
mod relationship;

pub use document::{EvidenceDocument, Provenance};
pub use entity::Entity;
pub use event::{ParticipantRef, TimeInterval, WorldEvent};
pub use observation::Observation;
pub use pivot::{Pivot, PivotSummary};
pub use relationship::Relationship;
