//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration
//! - Ollama: LLM integration for extraction and queries
//! - Pivot catalog: built-in or file-based pivots
//! - Export: Model snapshots
//! - HTTP: REST API routes
//! - State: Shared application state

pub mod config;
pub mod export;
pub mod http;
pub mod ollama;
pub mod pivot_catalog;
pub mod state;
