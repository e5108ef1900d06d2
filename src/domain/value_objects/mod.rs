//! Value objects - Immutable objects defined by their attributes

mod geometry;
mod ids;
mod scalar;

pub use geometry::{Geometry, MalformedGeometryError, Shape, Vec2};
pub use ids::*;
pub use scalar::{AttributeValue, ObservationValue};
