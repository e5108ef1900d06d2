//! Model snapshot for download and archival

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::WorldModelService;
use crate::domain::aggregates::{ModelStats, WorldModel};
use crate::domain::value_objects::PivotId;

/// Base model plus the context needed to reproduce the composed view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub exported_at: DateTime<Utc>,
    /// Base revision the snapshot was taken at
    pub revision: u64,
    pub active_pivots: Vec<PivotId>,
    pub stats: ModelStats,
    pub model: WorldModel,
}

impl ModelSnapshot {
    pub fn capture(service: &WorldModelService) -> Self {
        let model = WorldModel::clone(&service.base());
        Self {
            exported_at: Utc::now(),
            revision: service.revision(),
            active_pivots: service.selection().iter().cloned().collect(),
            stats: model.stats(),
            model,
        }
    }
}
