//! Aggregates - Consistency boundaries for domain operations

mod world_model;

pub use world_model::{
    AppendError, DanglingReference, ModelNotes, ModelStats, RecordKind, WorldModel,
};
