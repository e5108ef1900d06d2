//! Pivot catalog - built-in pivots or a JSON file of them

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::entities::{Entity, Pivot, TimeInterval, WorldEvent};
use crate::domain::services::BranchRegistry;
use crate::domain::value_objects::Geometry;

/// Pivots available when no catalog file is configured
pub fn builtin_pivots() -> Vec<Pivot> {
    vec![
        Pivot::new("P_SING", "Technological Singularity")
            .with_description("Recursive self-improvement produces a superintelligent system.")
            .with_impact("EXTREME")
            .with_entity(
                Entity::new("ASI-1", "System", "Ascendant Mind")
                    .with_valid_time("2045")
                    .with_attribute("substrate", "distributed compute")
                    .with_location(Geometry::point(0.0, 0.0)),
            )
            .with_event(
                WorldEvent::new("EV-SINGULARITY", "Incident", TimeInterval::instant("2045"))
                    .with_location_ref("ASI-1")
                    .with_participant("ASI-1", "origin")
                    .with_effect("Human labour markets restructure"),
            ),
        Pivot::new("P_MARS", "Early Mars Colony")
            .with_description("A permanent settlement is established on Mars.")
            .with_impact("HIGH")
            .with_entity(
                Entity::new("ARES-BASE", "Location", "Ares Base")
                    .with_alias("First Martian Settlement")
                    .with_valid_time("2031")
                    .with_location(Geometry::polygon([
                        (150.0, -40.0),
                        (170.0, -40.0),
                        (170.0, -25.0),
                        (150.0, -25.0),
                    ])),
            )
            .with_event(
                WorldEvent::new("EV-ARES-LANDING", "Shipment", TimeInterval::instant("2031"))
                    .with_location_ref("ARES-BASE")
                    .with_effect("Interplanetary supply chain opens"),
            ),
    ]
}

/// Build the registry from `path`, or from the built-in pivots when `None`
pub fn load_registry(path: Option<&Path>) -> Result<BranchRegistry> {
    let pivots = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read pivot catalog {}", path.display()))?;
            let pivots = parse_catalog(&raw)
                .with_context(|| format!("Invalid pivot catalog {}", path.display()))?;
            info!(path = %path.display(), count = pivots.len(), "Loaded pivot catalog");
            pivots
        }
        None => builtin_pivots(),
    };

    BranchRegistry::from_pivots(pivots).context("Pivot catalog contains duplicate ids")
}

fn parse_catalog(raw: &str) -> Result<Vec<Pivot>> {
    let pivots: Vec<Pivot> = serde_json::from_str(raw)?;
    for pivot in &pivots {
        for entity in &pivot.entities {
            entity
                .validate()
                .map_err(|reason| anyhow::anyhow!("{}: entity {}: {}", pivot.pivot_id, entity.entity_id, reason))?;
        }
        for event in &pivot.events {
            event
                .validate()
                .map_err(|reason| anyhow::anyhow!("{}: event {}: {}", pivot.pivot_id, event.event_id, reason))?;
        }
    }
    Ok(pivots)
}
