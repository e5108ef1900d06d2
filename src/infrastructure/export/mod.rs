//! Model export
//!
//! A [`ModelSnapshot`] is the downloadable form of the base model together
//! with the pivot selection active when it was taken.

mod model_snapshot;

pub use model_snapshot::ModelSnapshot;
