//! Planar geometry attached to entities and events
//!
//! Geometry arrives from extraction output in a GeoJSON-like shape and is
//! stored as-is. Validation happens when a frame is projected, so a bad ring
//! only removes its own record from the spatial frame.

use serde::{Deserialize, Serialize};

/// Raw geometry as recorded in the world model
///
/// Serialized as `{"type": "Point", "coordinates": [x, y]}` or
/// `{"type": "Polygon", "coordinates": [[x, y], ...]}`. The GeoJSON ring
/// nesting `[[[x, y], ...]]` is accepted for polygons. Deserialization never
/// rejects an unknown `type` or badly nested coordinates; `validate` reports
/// them instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Coordinates,
}

/// Coordinate arrays of any nesting depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Position(Vec<f64>),
    Ring(Vec<Vec<f64>>),
    Rings(Vec<Vec<Vec<f64>>>),
    Other(serde_json::Value),
}

impl Default for Coordinates {
    fn default() -> Self {
        Coordinates::Other(serde_json::Value::Null)
    }
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: Coordinates::Position(vec![x, y]),
        }
    }

    pub fn polygon<I>(ring: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            kind: "Polygon".to_string(),
            coordinates: Coordinates::Ring(ring.into_iter().map(|(x, y)| vec![x, y]).collect()),
        }
    }

    /// Check the geometry and convert it into a renderable shape
    pub fn validate(&self) -> Result<Shape, MalformedGeometryError> {
        match self.kind.as_str() {
            "Point" => match &self.coordinates {
                Coordinates::Position(coords) => Ok(Shape::Point(vec2(coords, 0)?)),
                _ => Err(MalformedGeometryError::WrongNesting { kind: self.kind.clone() }),
            },
            "Polygon" => {
                let ring: &[Vec<f64>] = match &self.coordinates {
                    Coordinates::Ring(ring) => ring,
                    // outer ring; holes are not rendered
                    Coordinates::Rings(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
                    Coordinates::Position(coords) if coords.is_empty() => &[],
                    _ => {
                        return Err(MalformedGeometryError::WrongNesting { kind: self.kind.clone() })
                    }
                };
                if ring.len() < 3 {
                    return Err(MalformedGeometryError::RingTooShort { len: ring.len() });
                }
                let vertices = ring
                    .iter()
                    .enumerate()
                    .map(|(index, coords)| vec2(coords, index))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Shape::Polygon(vertices))
            }
            other => Err(MalformedGeometryError::UnsupportedType {
                kind: other.to_string(),
            }),
        }
    }
}

fn vec2(coords: &[f64], index: usize) -> Result<Vec2, MalformedGeometryError> {
    if coords.len() != 2 {
        return Err(MalformedGeometryError::WrongArity {
            index,
            len: coords.len(),
        });
    }
    if !coords.iter().all(|c| c.is_finite()) {
        return Err(MalformedGeometryError::NonFinite { index });
    }
    Ok(Vec2::new(coords[0], coords[1]))
}

/// Reasons a geometry cannot be rendered
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum MalformedGeometryError {
    #[error("unsupported geometry type {kind:?}")]
    UnsupportedType { kind: String },
    #[error("{kind} coordinates are nested incorrectly")]
    WrongNesting { kind: String },
    #[error("polygon ring has {len} vertices, at least 3 required")]
    RingTooShort { len: usize },
    #[error("coordinate {index} has {len} components, expected 2")]
    WrongArity { index: usize, len: usize },
    #[error("coordinate {index} is not finite")]
    NonFinite { index: usize },
}

/// A point on the planar map
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Vec2) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Validated, renderable geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Shape {
    Point(Vec2),
    Polygon(Vec<Vec2>),
}

impl Shape {
    /// Translate every coordinate by the same offset
    pub fn translated(&self, by: Vec2) -> Shape {
        match self {
            Shape::Point(p) => Shape::Point(p.offset(by)),
            Shape::Polygon(ring) => Shape::Polygon(ring.iter().map(|v| v.offset(by)).collect()),
        }
    }

    /// The point an event marker is drawn at: the point itself, or the
    /// first vertex of a ring
    pub fn anchor(&self) -> Vec2 {
        match self {
            Shape::Point(p) => *p,
            Shape::Polygon(ring) => ring.first().copied().unwrap_or(Vec2::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(json: &str) -> Geometry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_geometry_json_shape() {
        let polygon = geometry(r#"{"type":"Polygon","coordinates":[[0,0],[10,0],[10,10]]}"#);
        assert_eq!(polygon, Geometry::polygon([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));

        let point = geometry(r#"{"type":"Point","coordinates":[1.5,-2]}"#);
        assert_eq!(point, Geometry::point(1.5, -2.0));
        assert_eq!(point.validate(), Ok(Shape::Point(Vec2::new(1.5, -2.0))));

        let out = serde_json::to_string(&Geometry::point(1.0, 2.0)).unwrap();
        assert_eq!(out, r#"{"type":"Point","coordinates":[1.0,2.0]}"#);
    }

    #[test]
    fn test_geojson_ring_nesting_is_accepted() {
        let polygon = geometry(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]],[[0.2,0.2],[0.3,0.2],[0.3,0.3]]]}"#);
        assert_eq!(
            polygon.validate(),
            Ok(Shape::Polygon(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
            ]))
        );
    }

    #[test]
    fn test_unknown_type_and_bad_nesting_deserialize_but_fail_validation() {
        let line = geometry(r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#);
        assert_eq!(
            line.validate(),
            Err(MalformedGeometryError::UnsupportedType {
                kind: "LineString".into()
            })
        );

        let point = geometry(r#"{"type":"Point","coordinates":[[1,2]]}"#);
        assert_eq!(
            point.validate(),
            Err(MalformedGeometryError::WrongNesting { kind: "Point".into() })
        );

        let garbage = geometry(r#"{"type":"Polygon","coordinates":"north of the river"}"#);
        assert!(matches!(garbage.coordinates, Coordinates::Other(_)));
        assert!(garbage.validate().is_err());

        let missing = geometry(r#"{"coordinates":[1,2]}"#);
        assert!(matches!(
            missing.validate(),
            Err(MalformedGeometryError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_short_ring_is_malformed() {
        let geometry = Geometry::polygon([(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            geometry.validate(),
            Err(MalformedGeometryError::RingTooShort { len: 2 })
        );
    }

    #[test]
    fn test_wrong_arity_is_malformed() {
        let point = geometry(r#"{"type":"Point","coordinates":[1,2,3]}"#);
        assert_eq!(
            point.validate(),
            Err(MalformedGeometryError::WrongArity { index: 0, len: 3 })
        );

        let ring = geometry(r#"{"type":"Polygon","coordinates":[[0,0],[1],[2,2]]}"#);
        assert_eq!(
            ring.validate(),
            Err(MalformedGeometryError::WrongArity { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_non_finite_is_malformed() {
        let point = Geometry::point(f64::NAN, 0.0);
        assert_eq!(point.validate(), Err(MalformedGeometryError::NonFinite { index: 0 }));
    }

    #[test]
    fn test_translate_and_anchor() {
        let shape = Geometry::polygon([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])
            .validate()
            .unwrap();
        let moved = shape.translated(Vec2::new(12.0, 4.0));
        assert_eq!(moved.anchor(), Vec2::new(12.0, 4.0));
        match moved {
            Shape::Polygon(ring) => assert_eq!(ring[2], Vec2::new(22.0, 14.0)),
            Shape::Point(_) => panic!("expected polygon"),
        }
    }
}
