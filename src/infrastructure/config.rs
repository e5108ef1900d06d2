//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::services::extraction_service::DEFAULT_MIN_CONTENT_CHARS;

/// Application configuration loaded from environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Ollama API base URL (OpenAI-compatible)
    pub ollama_base_url: String,
    /// Model used for extraction
    pub ollama_model: String,
    /// Model used for queries against the world model
    pub ollama_query_model: String,

    /// HTTP server port
    pub server_port: u16,

    /// Minimum non-whitespace characters accepted for extraction
    pub extraction_min_chars: usize,

    /// JSON pivot catalog; the built-in catalog is used when unset
    pub pivot_catalog_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ollama_model = lookup("OLLAMA_MODEL").unwrap_or_else(|| "llama3.1:8b".to_string());

        Ok(Self {
            ollama_base_url: lookup("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434/v1".to_string()),
            ollama_query_model: lookup("OLLAMA_QUERY_MODEL").unwrap_or_else(|| ollama_model.clone()),
            ollama_model,

            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            extraction_min_chars: match lookup("EXTRACTION_MIN_CHARS") {
                Some(value) => value
                    .parse()
                    .context("EXTRACTION_MIN_CHARS must be a non-negative integer")?,
                None => DEFAULT_MIN_CONTENT_CHARS,
            },

            pivot_catalog_path: lookup("PIVOT_CATALOG_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
