//! World Model Service - Owns the base model and the active pivot selection
//!
//! The domain is pure; this service is the caller that keeps state between
//! requests: the base model (grown by ingestion), the revision counter, the
//! pivot selection, the ingestion history and a memo of composed models.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::aggregates::{AppendError, ModelStats, WorldModel};
use crate::domain::services::{
    compose, project, timeline, BranchError, BranchRegistry, Frame, PivotSelection, TimeRange,
    TimelineEntry, ZoomLevel,
};
use crate::domain::value_objects::{IngestionId, PivotId};

/// One successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionRecord {
    pub ingestion_id: IngestionId,
    pub ingested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Counts of the appended fragment
    pub added: ModelStats,
    /// Base revision after the append
    pub revision: u64,
}

pub struct WorldModelService {
    base: Arc<WorldModel>,
    revision: u64,
    registry: BranchRegistry,
    selection: PivotSelection,
    history: Vec<IngestionRecord>,
    /// Composed models for the current revision, keyed by selection
    composed: Mutex<HashMap<PivotSelection, Arc<WorldModel>>>,
}

impl WorldModelService {
    pub fn new(registry: BranchRegistry) -> Self {
        Self::with_base(WorldModel::new(), registry)
    }

    pub fn with_base(base: WorldModel, registry: BranchRegistry) -> Self {
        Self {
            base: Arc::new(base),
            revision: 0,
            registry,
            selection: PivotSelection::new(),
            history: Vec::new(),
            composed: Mutex::new(HashMap::new()),
        }
    }

    pub fn base(&self) -> Arc<WorldModel> {
        Arc::clone(&self.base)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn registry(&self) -> &BranchRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &PivotSelection {
        &self.selection
    }

    pub fn history(&self) -> &[IngestionRecord] {
        &self.history
    }

    /// Append an extracted fragment to the base model
    ///
    /// On error the base is left exactly as it was.
    #[instrument(skip(self, fragment), fields(revision = self.revision))]
    pub fn ingest(
        &mut self,
        fragment: &WorldModel,
        source: Option<String>,
    ) -> Result<IngestionRecord, AppendError> {
        let grown = self.base.append(fragment)?;

        self.base = Arc::new(grown);
        self.revision += 1;
        self.clear_composed();

        let record = IngestionRecord {
            ingestion_id: IngestionId::new(),
            ingested_at: Utc::now(),
            source,
            added: fragment.stats(),
            revision: self.revision,
        };
        info!(
            ingestion_id = %record.ingestion_id,
            revision = record.revision,
            entities = record.added.entities,
            events = record.added.events,
            "Fragment ingested"
        );
        self.history.push(record.clone());
        Ok(record)
    }

    /// Switch a pivot on or off; returns whether it is now active
    #[instrument(skip(self, pivot_id), fields(pivot_id = %pivot_id))]
    pub fn toggle_pivot(&mut self, pivot_id: PivotId) -> Result<bool, BranchError> {
        if self.registry.get(&pivot_id).is_none() {
            return Err(BranchError::UnknownPivot(pivot_id));
        }
        let active = self.selection.toggle(pivot_id);
        info!(active, "Pivot toggled");
        Ok(active)
    }

    /// Base plus the overlays of the active selection, memoized per selection
    pub fn composed_model(&self) -> Result<Arc<WorldModel>, BranchError> {
        let mut cache = self.composed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(model) = cache.get(&self.selection) {
            return Ok(Arc::clone(model));
        }

        let overlay = self.registry.select(&self.selection)?;
        let model = Arc::new(compose(&self.base, &overlay));
        debug!(
            revision = self.revision,
            overlay_entities = overlay.entities().len(),
            overlay_events = overlay.events().len(),
            "Composed model cached"
        );
        cache.insert(self.selection.clone(), Arc::clone(&model));
        Ok(model)
    }

    /// Frame of the composed model at instant `t`
    pub fn project(&self, t: f64, zoom: ZoomLevel) -> Result<Frame, BranchError> {
        let model = self.composed_model()?;
        Ok(project(&model, t, zoom))
    }

    /// Scrubber bounds for the composed model
    pub fn timeline_bounds(&self) -> Result<TimeRange, BranchError> {
        Ok(TimeRange::for_model(&*self.composed_model()?))
    }

    /// Events of the composed model in chronological order
    pub fn timeline(&self) -> Result<Vec<TimelineEntry>, BranchError> {
        Ok(timeline(&*self.composed_model()?))
    }

    fn clear_composed(&self) {
        self.composed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    #[cfg(test)]
    fn cached_compositions(&self) -> usize {
        self.composed.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Entity, Pivot, TimeInterval, WorldEvent};
    use crate::domain::value_objects::Geometry;

    fn registry() -> BranchRegistry {
        BranchRegistry::from_pivots([Pivot::new("P_SING", "Technological Singularity")
            .with_entity(
                Entity::new("ASI-1", "System", "Ascendant Mind")
                    .with_valid_time("2045")
                    .with_location(Geometry::point(10.0, 10.0)),
            )
            .with_event(
                WorldEvent::new("EV-SING", "Singularity", TimeInterval::instant("2045"))
                    .with_location_ref("ASI-1"),
            )])
        .unwrap()
    }

    fn fragment(entity_id: &str) -> WorldModel {
        let mut model = WorldModel::new();
        model.entities.push(
            Entity::new(entity_id, "Person", "James Watt")
                .with_valid_time("1736")
                .with_location(Geometry::point(1.0, 2.0)),
        );
        model
    }

    #[test]
    fn test_ingest_grows_base_and_records_history() {
        let mut service = WorldModelService::new(registry());
        let record = service
            .ingest(&fragment("watt"), Some("wiki".to_string()))
            .unwrap();

        assert_eq!(record.revision, 1);
        assert_eq!(record.added.entities, 1);
        assert_eq!(record.source.as_deref(), Some("wiki"));
        assert_eq!(service.base().entities.len(), 1);
        assert_eq!(service.history().len(), 1);
    }

    #[test]
    fn test_rejected_ingest_leaves_base_intact() {
        let mut service = WorldModelService::new(registry());
        service.ingest(&fragment("watt"), None).unwrap();
        let before = service.base();

        let err = service.ingest(&fragment("watt"), None).unwrap_err();
        assert!(matches!(err, AppendError::DuplicateId { .. }));
        assert_eq!(*service.base(), *before);
        assert_eq!(service.revision(), 1);
        assert_eq!(service.history().len(), 1);
    }

    #[test]
    fn test_branch_tagged_fragment_cannot_enter_the_base() {
        let mut service = WorldModelService::new(registry());
        let forged: WorldModel = serde_json::from_str(
            r#"{"entities": [{"entity_id": "ASI-1", "entity_type": "System",
                "names": ["Ascendant Mind"], "branch_id": "P_SING"}]}"#,
        )
        .unwrap();

        let err = service.ingest(&forged, None).unwrap_err();
        assert!(matches!(err, AppendError::InvalidRecord { ref id, .. } if id == "ASI-1"));
        assert_eq!(service.base().stats().branched_records, 0);
        assert_eq!(service.revision(), 0);

        service.toggle_pivot(PivotId::from("P_SING")).unwrap();
        let composed = service.composed_model().unwrap();
        let asi: Vec<_> = composed
            .entities
            .iter()
            .filter(|e| e.entity_id.as_str() == "ASI-1")
            .collect();
        assert_eq!(asi.len(), 1);

        service.toggle_pivot(PivotId::from("P_SING")).unwrap();
        assert_eq!(*service.composed_model().unwrap(), *service.base());
    }

    #[test]
    fn test_toggle_unknown_pivot() {
        let mut service = WorldModelService::new(registry());
        assert_eq!(
            service.toggle_pivot(PivotId::from("P_NONE")),
            Err(BranchError::UnknownPivot(PivotId::from("P_NONE")))
        );
        assert!(service.selection().is_empty());
    }

    #[test]
    fn test_composed_model_follows_selection() {
        let mut service = WorldModelService::new(registry());
        service.ingest(&fragment("watt"), None).unwrap();

        assert_eq!(*service.composed_model().unwrap(), *service.base());

        assert!(service.toggle_pivot(PivotId::from("P_SING")).unwrap());
        let composed = service.composed_model().unwrap();
        assert_eq!(composed.entities.len(), 2);
        assert_eq!(composed.stats().branched_records, 2);

        assert!(!service.toggle_pivot(PivotId::from("P_SING")).unwrap());
        assert_eq!(*service.composed_model().unwrap(), *service.base());
    }

    #[test]
    fn test_composition_memo_is_reused_and_invalidated() {
        let mut service = WorldModelService::new(registry());
        service.toggle_pivot(PivotId::from("P_SING")).unwrap();

        let first = service.composed_model().unwrap();
        let second = service.composed_model().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.cached_compositions(), 1);

        service.ingest(&fragment("watt"), None).unwrap();
        assert_eq!(service.cached_compositions(), 0);
        let third = service.composed_model().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.entities.len(), 2);
    }

    #[test]
    fn test_project_uses_composed_model() {
        let mut service = WorldModelService::new(registry());
        service.ingest(&fragment("watt"), None).unwrap();
        service.toggle_pivot(PivotId::from("P_SING")).unwrap();

        let frame = service.project(2045.0, ZoomLevel::default()).unwrap();
        assert_eq!(frame.entities.len(), 2);
        assert_eq!(frame.events.len(), 1);
        assert!(frame.events[0].branched);

        let early = service.project(1800.0, ZoomLevel::default()).unwrap();
        assert_eq!(early.entities.len(), 1);
        assert!(early.events.is_empty());
    }

    #[test]
    fn test_timeline_includes_active_overlay_events() {
        let mut service = WorldModelService::new(registry());
        let mut base = WorldModel::new();
        base.events
            .push(WorldEvent::new("EV-ENGINE", "Invention", TimeInterval::instant("1769")));
        service.ingest(&base, None).unwrap();
        assert_eq!(service.timeline().unwrap().len(), 1);

        service.toggle_pivot(PivotId::from("P_SING")).unwrap();
        let entries = service.timeline().unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["EV-ENGINE", "EV-SING"]);
        assert!(entries[1].branched);
    }

    #[test]
    fn test_timeline_bounds_default_for_empty_model() {
        let service = WorldModelService::new(registry());
        assert_eq!(service.timeline_bounds().unwrap(), TimeRange::default());
    }
}
