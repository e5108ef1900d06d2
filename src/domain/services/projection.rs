//! Projection engine - the renderable state of a world model at one instant
//!
//! `project` is a pure function of the composed model, the query instant and
//! the zoom level. It decides which entities exist yet, which events are
//! close enough in time to show, where everything sits after drift, and it
//! never fails: a record with unusable geometry is moved to the frame's
//! unplaced listings instead of blanking the frame.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::WorldModel;
use crate::domain::entities::{Entity, WorldEvent};
use crate::domain::services::time_codec;
use crate::domain::value_objects::{EntityId, EventId, Geometry, MalformedGeometryError, Shape, Vec2};

/// Map units travelled per million years by drift-capable entities
pub const DRIFT_RATE: Vec2 = Vec2 { x: 12.0, y: 4.0 };

/// Smallest half-width, in years, of the window in which an event is active
pub const MIN_EVENT_WINDOW: f64 = 10.0;
/// Share of |t| used as the event window further from year zero
pub const EVENT_WINDOW_FRACTION: f64 = 0.1;

/// Name fragment marking an entity as a tectonic plate
const DRIFT_KEYWORD: &str = "plate";

/// Camera altitude of the viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    #[default]
    SpaceStation,
    Airplane,
    Bird,
    Human,
    Molecular,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 5] = [
        ZoomLevel::SpaceStation,
        ZoomLevel::Airplane,
        ZoomLevel::Bird,
        ZoomLevel::Human,
        ZoomLevel::Molecular,
    ];

    /// Map scale factor
    pub fn scale(self) -> f64 {
        match self {
            ZoomLevel::SpaceStation => 1.0,
            ZoomLevel::Airplane => 5.0,
            ZoomLevel::Bird => 20.0,
            ZoomLevel::Human => 100.0,
            ZoomLevel::Molecular => 1000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoomLevel::SpaceStation => "Space Station View",
            ZoomLevel::Airplane => "Airplane View",
            ZoomLevel::Bird => "Bird's Eye View",
            ZoomLevel::Human => "Human Level",
            ZoomLevel::Molecular => "Molecular Detail",
        }
    }
}

impl std::str::FromStr for ZoomLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "space_station" | "" => Ok(ZoomLevel::SpaceStation),
            "airplane" => Ok(ZoomLevel::Airplane),
            "bird" => Ok(ZoomLevel::Bird),
            "human" => Ok(ZoomLevel::Human),
            "molecular" => Ok(ZoomLevel::Molecular),
            _ => Err(format!("Invalid zoom level: {}", s)),
        }
    }
}

/// Colour family for landmasses at the frame's instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainPalette {
    /// Before 500 Ma: barren, volcanic
    Primordial,
    Temperate,
    /// Beyond 1 Ga from now
    FarFuture,
}

/// Presentation hints derived from the instant and zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStyle {
    pub zoom_scale: f64,
    /// Event labels are legible only when zoomed in past the airplane view
    pub show_labels: bool,
    pub terrain: TerrainPalette,
    /// Molten-planet glow before 4 Ga
    pub planetary_glow: bool,
}

impl FrameStyle {
    pub fn at(t: f64, zoom: ZoomLevel) -> Self {
        let terrain = if t < -500.0 * time_codec::MEGA_YEARS {
            TerrainPalette::Primordial
        } else if t > time_codec::GIGA_YEARS {
            TerrainPalette::FarFuture
        } else {
            TerrainPalette::Temperate
        };
        Self {
            zoom_scale: zoom.scale(),
            show_labels: zoom.scale() > 5.0,
            terrain,
            planetary_glow: t < -4.0 * time_codec::GIGA_YEARS,
        }
    }
}

/// A visible entity placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEntity {
    pub entity_id: EntityId,
    pub display_name: String,
    pub entity_type: String,
    /// Geometry after drift
    pub shape: Shape,
    pub drift: Vec2,
    pub branched: bool,
}

/// An active event placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEvent {
    pub event_id: EventId,
    pub event_type: String,
    pub position: Vec2,
    /// Fade factor in [0, 1], 1 at the event's own instant
    pub opacity: f64,
    pub branched: bool,
}

/// Why a visible record could not be placed on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnplacedReason {
    NoLocation,
    UnresolvedLocationRef { entity_id: EntityId },
    MalformedGeometry { error: MalformedGeometryError },
}

/// A visible entity or active event that only appears in listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnplacedRecord {
    pub id: String,
    pub branched: bool,
    /// Set for events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(flatten)]
    pub reason: UnplacedReason,
}

/// Everything a renderer needs for one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub at: f64,
    pub label: String,
    pub zoom: ZoomLevel,
    pub zoom_label: &'static str,
    pub entities: Vec<ProjectedEntity>,
    pub events: Vec<ProjectedEvent>,
    pub unplaced_entities: Vec<UnplacedRecord>,
    pub unplaced_events: Vec<UnplacedRecord>,
    pub style: FrameStyle,
}

impl Frame {
    pub fn entity(&self, id: &EntityId) -> Option<&ProjectedEntity> {
        self.entities.iter().find(|e| &e.entity_id == id)
    }

    pub fn event(&self, id: &EventId) -> Option<&ProjectedEvent> {
        self.events.iter().find(|e| &e.event_id == id)
    }
}

/// An entity is visible once its valid time has been reached; undated
/// entities are always visible
pub fn is_visible(entity: &Entity, t: f64) -> bool {
    entity
        .valid_time
        .as_deref()
        .map_or(true, |literal| t >= time_codec::parse(literal))
}

/// Half-width of the activity window around `t`
pub fn event_window(t: f64) -> f64 {
    MIN_EVENT_WINDOW.max(t.abs() * EVENT_WINDOW_FRACTION)
}

/// Opacity of an event anchored at `anchor` when viewed at `t`, or `None`
/// when the event lies outside the window
pub fn event_opacity(anchor: f64, t: f64) -> Option<f64> {
    let window = event_window(t);
    let distance = (anchor - t).abs();
    (distance <= window).then(|| (1.0 - distance / window).max(0.0))
}

pub fn is_drift_capable(entity: &Entity) -> bool {
    entity.entity_type.eq_ignore_ascii_case("landmass")
        || entity
            .names
            .iter()
            .any(|name| name.to_lowercase().contains(DRIFT_KEYWORD))
}

/// Displacement accumulated since the entity's valid time
pub fn drift_offset(entity: &Entity, t: f64) -> Vec2 {
    if !is_drift_capable(entity) {
        return Vec2::ZERO;
    }
    let Some(valid_from) = entity.valid_time.as_deref().map(time_codec::parse) else {
        return Vec2::ZERO;
    };
    let elapsed_myr = (t - valid_from) / time_codec::MEGA_YEARS;
    Vec2::new(elapsed_myr * DRIFT_RATE.x, elapsed_myr * DRIFT_RATE.y)
}

/// Compute the frame for instant `t`
pub fn project(model: &WorldModel, t: f64, zoom: ZoomLevel) -> Frame {
    let mut frame = Frame {
        at: t,
        label: time_codec::format_long(t),
        zoom,
        zoom_label: zoom.label(),
        entities: Vec::new(),
        events: Vec::new(),
        unplaced_entities: Vec::new(),
        unplaced_events: Vec::new(),
        style: FrameStyle::at(t, zoom),
    };

    for entity in model.entities.iter().filter(|e| is_visible(e, t)) {
        match place_entity(entity, t) {
            Ok(projected) => frame.entities.push(projected),
            Err(reason) => frame.unplaced_entities.push(UnplacedRecord {
                id: entity.entity_id.to_string(),
                branched: entity.is_branched(),
                opacity: None,
                reason,
            }),
        }
    }

    for event in &model.events {
        let Some(anchor) = event.time_interval.anchor().map(time_codec::parse) else {
            continue;
        };
        let Some(opacity) = event_opacity(anchor, t) else {
            continue;
        };
        match locate_event(model, event) {
            Ok(position) => frame.events.push(ProjectedEvent {
                event_id: event.event_id.clone(),
                event_type: event.event_type.clone(),
                position,
                opacity,
                branched: event.is_branched(),
            }),
            Err(reason) => frame.unplaced_events.push(UnplacedRecord {
                id: event.event_id.to_string(),
                branched: event.is_branched(),
                opacity: Some(opacity),
                reason,
            }),
        }
    }

    frame
}

fn place_entity(entity: &Entity, t: f64) -> Result<ProjectedEntity, UnplacedReason> {
    let shape = validated(entity.location.as_ref())?;
    let drift = drift_offset(entity, t);
    Ok(ProjectedEntity {
        entity_id: entity.entity_id.clone(),
        display_name: entity.display_name().to_string(),
        entity_type: entity.entity_type.clone(),
        shape: shape.translated(drift),
        drift,
        branched: entity.is_branched(),
    })
}

/// The event's own location, else its referenced entity's recorded location
fn locate_event(model: &WorldModel, event: &WorldEvent) -> Result<Vec2, UnplacedReason> {
    let geometry = match (&event.location, &event.location_ref) {
        (Some(own), _) => Some(own),
        (None, Some(entity_id)) => {
            let entity = model
                .find_entity(entity_id)
                .ok_or_else(|| UnplacedReason::UnresolvedLocationRef {
                    entity_id: entity_id.clone(),
                })?;
            entity.location.as_ref()
        }
        (None, None) => None,
    };
    validated(geometry).map(|shape| shape.anchor())
}

fn validated(geometry: Option<&Geometry>) -> Result<Shape, UnplacedReason> {
    geometry
        .ok_or(UnplacedReason::NoLocation)?
        .validate()
        .map_err(|error| UnplacedReason::MalformedGeometry { error })
}
