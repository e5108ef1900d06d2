//! EvidenceDocument - Provenance records for extracted data

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DocumentId, EntityId};

/// Provenance record; `content_ref` points at the original material and never
/// holds the content itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceDocument {
    pub document_id: DocumentId,
    pub document_type: String,
    pub content_ref: String,
    #[serde(default)]
    pub extracted_refs: Vec<EntityId>,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credibility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub origin: String,
    pub timestamp: String,
}

impl EvidenceDocument {
    pub fn new(
        document_id: impl Into<DocumentId>,
        document_type: impl Into<String>,
        content_ref: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            document_type: document_type.into(),
            content_ref: content_ref.into(),
            extracted_refs: Vec::new(),
            provenance,
            credibility: None,
        }
    }

    pub fn with_credibility(mut self, credibility: f64) -> Self {
        self.credibility = Some(credibility);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.credibility {
            Some(c) if !(0.0..=1.0).contains(&c) => {
                Err(format!("credibility {} is outside [0, 1]", c))
            }
            _ => Ok(()),
        }
    }
}
