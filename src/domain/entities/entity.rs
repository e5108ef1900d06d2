//! Entity - Persistent things in the world model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AttributeValue, DocumentId, EntityId, Geometry, PivotId};

/// A persistent thing: a person, an organization, a landmass, ...
///
/// `entity_type` is an open string. The recognized set (Person, Organization,
/// Location, Asset, Product, System, Landmass) only matters to presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub entity_type: String,
    /// Known names, the first one is used for display
    pub names: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Time literal at which the entity comes into existence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Geometry>,
    #[serde(default)]
    pub source_refs: Vec<DocumentId>,
    /// Set only on records injected by a pivot overlay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<PivotId>,
}

impl Entity {
    pub fn new(
        entity_id: impl Into<EntityId>,
        entity_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_type: entity_type.into(),
            names: vec![name.into()],
            attributes: BTreeMap::new(),
            valid_time: None,
            location: None,
            source_refs: Vec::new(),
            branch_id: None,
        }
    }

    pub fn with_alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_valid_time(mut self, literal: impl Into<String>) -> Self {
        self.valid_time = Some(literal.into());
        self
    }

    pub fn with_location(mut self, location: Geometry) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_source(mut self, document_id: impl Into<DocumentId>) -> Self {
        self.source_refs.push(document_id.into());
        self
    }

    pub fn with_branch(mut self, pivot_id: PivotId) -> Self {
        self.branch_id = Some(pivot_id);
        self
    }

    /// Canonical display name
    pub fn display_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_branched(&self) -> bool {
        self.branch_id.is_some()
    }

    /// Check the record's schema invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.entity_id.as_str().trim().is_empty() {
            return Err("entity_id cannot be empty".to_string());
        }
        if self.names.is_empty() {
            return Err("names must contain at least one name".to_string());
        }
        Ok(())
    }
}
