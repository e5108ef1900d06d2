//! Application services - Use case implementations
//!
//! LLM-backed collaborators are generic over `L: LlmPort` so tests can run
//! them against mocks; `WorldModelService` keeps the state between requests.

pub mod extraction_service;
pub mod query_service;
pub mod world_model_service;

pub use extraction_service::{ExtractionError, ExtractionService};
pub use query_service::{QueryError, QueryService};
pub use world_model_service::{IngestionRecord, WorldModelService};
