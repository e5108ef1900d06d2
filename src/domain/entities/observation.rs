//! Observation - Scalar measurements tied to a subject entity

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DocumentId, EntityId, ObservationId, ObservationValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub observation_id: ObservationId,
    pub subject_ref: EntityId,
    pub metric_name: String,
    pub value: ObservationValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub observation_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<String>,
    #[serde(default)]
    pub source_refs: Vec<DocumentId>,
}

impl Observation {
    pub fn new(
        observation_id: impl Into<ObservationId>,
        subject_ref: impl Into<EntityId>,
        metric_name: impl Into<String>,
        value: ObservationValue,
        observation_time: impl Into<String>,
    ) -> Self {
        Self {
            observation_id: observation_id.into(),
            subject_ref: subject_ref.into(),
            metric_name: metric_name.into(),
            value,
            unit: None,
            observation_time: observation_time.into(),
            uncertainty: None,
            source_refs: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}
