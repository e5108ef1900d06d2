//! Composer - base reality plus the active pivot overlays
//!
//! Overlays contribute entities and events only. Relationships,
//! observations, documents and notes of the composed model are those of the
//! base; pivots do not carry them.

use crate::domain::aggregates::WorldModel;
use crate::domain::services::branch_registry::BranchOverlay;

/// Derive the working model for a selection without touching the base
pub fn compose(base: &WorldModel, overlay: &BranchOverlay) -> WorldModel {
    let mut composed = base.clone();
    composed.entities.extend(overlay.entities().iter().cloned());
    composed.events.extend(overlay.events().iter().cloned());
    composed
}
