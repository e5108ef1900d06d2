//! Branch registry - the pivot catalog and overlay selection
//!
//! Pivots are hypothetical divergences with a static overlay of entities and
//! events. The registry tags those records with the pivot's id and unions the
//! overlays of a selection in ascending pivot-id order, so the result never
//! depends on the order in which pivots were switched on.
//!
//! Overlapping pivots are not reconciled: if two pivots touch the same base
//! entity, both overlay records appear side by side.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::RecordKind;
use crate::domain::entities::{Entity, Pivot, PivotSummary, WorldEvent};
use crate::domain::value_objects::PivotId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BranchError {
    #[error("Pivot not found: {0}")]
    UnknownPivot(PivotId),
    #[error("Pivot registered twice: {0}")]
    DuplicatePivot(PivotId),
    #[error("Pivot {pivot_id} repeats {kind} id {id}")]
    DuplicateRecord {
        pivot_id: PivotId,
        kind: RecordKind,
        id: String,
    },
}

/// Entities and events contributed by the selected pivots
///
/// Only the registry builds overlays, so every record carries a `branch_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchOverlay {
    entities: Vec<Entity>,
    events: Vec<WorldEvent>,
}

impl BranchOverlay {
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.events.is_empty()
    }
}

/// The set of active pivots
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PivotSelection(BTreeSet<PivotId>);

impl PivotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a pivot in or out of the selection; returns whether it is now active
    pub fn toggle(&mut self, pivot_id: PivotId) -> bool {
        if self.0.remove(&pivot_id) {
            false
        } else {
            self.0.insert(pivot_id);
            true
        }
    }

    pub fn contains(&self, pivot_id: &PivotId) -> bool {
        self.0.contains(pivot_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PivotId> {
        self.0.iter()
    }
}

impl FromIterator<PivotId> for PivotSelection {
    fn from_iter<I: IntoIterator<Item = PivotId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Catalog of available pivots
#[derive(Debug, Clone, Default)]
pub struct BranchRegistry {
    pivots: BTreeMap<PivotId, Pivot>,
}

impl BranchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a catalog, rejecting repeated pivot ids
    pub fn from_pivots(pivots: impl IntoIterator<Item = Pivot>) -> Result<Self, BranchError> {
        let mut registry = Self::new();
        for pivot in pivots {
            registry.register(pivot)?;
        }
        Ok(registry)
    }

    /// Add a pivot, stamping its overlay records with the pivot's id
    ///
    /// Entity and event ids must be unique within the pivot.
    pub fn register(&mut self, pivot: Pivot) -> Result<(), BranchError> {
        if self.pivots.contains_key(&pivot.pivot_id) {
            return Err(BranchError::DuplicatePivot(pivot.pivot_id));
        }
        let repeated = first_repeat(pivot.entities.iter().map(|e| e.entity_id.as_str()))
            .map(|id| (RecordKind::Entity, id))
            .or_else(|| {
                first_repeat(pivot.events.iter().map(|e| e.event_id.as_str()))
                    .map(|id| (RecordKind::Event, id))
            });
        if let Some((kind, id)) = repeated {
            return Err(BranchError::DuplicateRecord {
                id: id.to_string(),
                pivot_id: pivot.pivot_id,
                kind,
            });
        }
        let pivot = pivot.tagged();
        self.pivots.insert(pivot.pivot_id.clone(), pivot);
        Ok(())
    }

    pub fn get(&self, pivot_id: &PivotId) -> Option<&Pivot> {
        self.pivots.get(pivot_id)
    }

    /// Catalog listing in pivot-id order
    pub fn pivots(&self) -> Vec<PivotSummary> {
        self.pivots.values().map(Pivot::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.pivots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pivots.is_empty()
    }

    /// Union of the overlays of every selected pivot
    pub fn select(&self, selection: &PivotSelection) -> Result<BranchOverlay, BranchError> {
        let mut overlay = BranchOverlay::default();
        // BTreeSet iteration is ascending, which fixes the overlay order
        for pivot_id in selection.iter() {
            let pivot = self
                .pivots
                .get(pivot_id)
                .ok_or_else(|| BranchError::UnknownPivot(pivot_id.clone()))?;
            overlay.entities.extend(pivot.entities.iter().cloned());
            overlay.events.extend(pivot.events.iter().cloned());
        }
        Ok(overlay)
    }
}

fn first_repeat<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TimeInterval;

    fn registry() -> BranchRegistry {
        BranchRegistry::from_pivots([
            Pivot::new("P_SING", "Technological Singularity")
                .with_impact("EXTREME")
                .with_entity(Entity::new("ASI-1", "System", "Ascendant Mind"))
                .with_event(WorldEvent::new("EV-SING", "Singularity", TimeInterval::instant("2045"))),
            Pivot::new("P_MARS", "Early Mars Colony")
                .with_impact("HIGH")
                .with_entity(Entity::new("ARES", "Location", "Ares Base")),
        ])
        .unwrap()
    }

    #[test]
    fn test_toggle_is_symmetric_difference() {
        let mut selection = PivotSelection::new();
        assert!(selection.toggle(PivotId::from("P_SING")));
        assert!(selection.contains(&PivotId::from("P_SING")));
        assert!(!selection.toggle(PivotId::from("P_SING")));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_is_order_independent() {
        let registry = registry();
        let ab: PivotSelection = [PivotId::from("P_SING"), PivotId::from("P_MARS")]
            .into_iter()
            .collect();
        let ba: PivotSelection = [PivotId::from("P_MARS"), PivotId::from("P_SING")]
            .into_iter()
            .collect();

        let overlay = registry.select(&ab).unwrap();
        assert_eq!(overlay, registry.select(&ba).unwrap());

        let ids: Vec<&str> = overlay.entities().iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["ARES", "ASI-1"]);
    }

    #[test]
    fn test_overlay_records_carry_branch_id() {
        let registry = registry();
        let selection: PivotSelection = [PivotId::from("P_SING")].into_iter().collect();
        let overlay = registry.select(&selection).unwrap();

        assert_eq!(overlay.entities().len(), 1);
        assert_eq!(overlay.events().len(), 1);
        assert_eq!(overlay.entities()[0].branch_id, Some(PivotId::from("P_SING")));
        assert_eq!(overlay.events()[0].branch_id, Some(PivotId::from("P_SING")));
    }

    #[test]
    fn test_empty_selection_yields_empty_overlay() {
        let overlay = registry().select(&PivotSelection::new()).unwrap();
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_unknown_pivot_is_an_error() {
        let selection: PivotSelection = [PivotId::from("P_NONE")].into_iter().collect();
        assert_eq!(
            registry().select(&selection),
            Err(BranchError::UnknownPivot(PivotId::from("P_NONE")))
        );
    }

    #[test]
    fn test_duplicate_pivot_rejected() {
        let mut registry = registry();
        let err = registry.register(Pivot::new("P_MARS", "Again")).unwrap_err();
        assert_eq!(err, BranchError::DuplicatePivot(PivotId::from("P_MARS")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_repeated_record_id_within_pivot_rejected() {
        let mut registry = BranchRegistry::new();
        let err = registry
            .register(
                Pivot::new("P_ROME", "Rome Never Falls")
                    .with_entity(Entity::new("ROME", "Organization", "Rome"))
                    .with_entity(Entity::new("ROME", "Organization", "Eternal Rome")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            BranchError::DuplicateRecord {
                pivot_id: PivotId::from("P_ROME"),
                kind: RecordKind::Entity,
                id: "ROME".to_string(),
            }
        );
        assert!(registry.is_empty());

        let err = registry
            .register(
                Pivot::new("P_ROME", "Rome Never Falls")
                    .with_event(WorldEvent::new("EV-1", "Battle", TimeInterval::instant("476")))
                    .with_event(WorldEvent::new("EV-1", "Battle", TimeInterval::instant("477"))),
            )
            .unwrap_err();
        assert!(matches!(err, BranchError::DuplicateRecord { kind: RecordKind::Event, .. }));
    }

    #[test]
    fn test_overlapping_pivots_coexist() {
        let registry = BranchRegistry::from_pivots([
            Pivot::new("P_A", "A").with_entity(Entity::new("rome-a", "Organization", "Rome")),
            Pivot::new("P_B", "B").with_entity(Entity::new("rome-b", "Organization", "Rome")),
        ])
        .unwrap();
        let selection: PivotSelection = [PivotId::from("P_A"), PivotId::from("P_B")].into_iter().collect();
        let overlay = registry.select(&selection).unwrap();
        assert_eq!(overlay.entities().len(), 2);
    }

    #[test]
    fn test_catalog_listing_sorted() {
        let listing = registry().pivots();
        assert_eq!(listing[0].pivot_id, PivotId::from("P_MARS"));
        assert_eq!(listing[1].expected_impact, "EXTREME");
    }
}
