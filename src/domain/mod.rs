//! Domain layer - Core world-model logic with no I/O
//!
//! This layer contains:
//! - Value Objects: ids, geometry, scalar attribute values
//! - Entities: entities, events, relationships, observations, documents, pivots
//! - Aggregates: the world model root and its append semantics
//! - Domain Services: time codec, branch registry, composer, projection

pub mod aggregates;
pub mod entities;
pub mod services;
pub mod value_objects;
