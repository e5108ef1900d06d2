//! Shared application state

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::application::services::{ExtractionService, QueryService, WorldModelService};
use crate::domain::services::BranchRegistry;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::pivot_catalog;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub llm_client: Arc<OllamaClient>,
    pub extraction_service: ExtractionService<OllamaClient>,
    pub query_service: QueryService<OllamaClient>,
    /// Base model, pivot selection and ingestion history
    pub world: RwLock<WorldModelService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let registry = pivot_catalog::load_registry(config.pivot_catalog_path.as_deref())?;
        Ok(Self::with_registry(config, registry))
    }

    pub fn with_registry(config: AppConfig, registry: BranchRegistry) -> Self {
        let llm_client = Arc::new(OllamaClient::new(&config.ollama_base_url, &config.ollama_model));
        let query_client = Arc::new(OllamaClient::new(
            &config.ollama_base_url,
            &config.ollama_query_model,
        ));

        let extraction_service = ExtractionService::new(Arc::clone(&llm_client))
            .with_min_content_chars(config.extraction_min_chars);
        let query_service = QueryService::new(query_client);

        Self {
            config,
            llm_client,
            extraction_service,
            query_service,
            world: RwLock::new(WorldModelService::new(registry)),
        }
    }
}
