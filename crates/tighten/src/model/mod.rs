//! Declared schema model: modules, entities, attributes, indexes and
//! relationships as described by the upstream application model.

mod attribute;
mod entity;
mod types;

pub use attribute::Attribute;
pub use entity::{Entity, Index, Relationship};
pub use types::{DataCategory, DataType, DeleteRule};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TightenError};

/// A module groups entities for rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }
}

/// The complete declared model handed to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Parse and validate a model from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: SchemaModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Iterate over every entity together with its module.
    pub fn entities(&self) -> impl Iterator<Item = (&Module, &Entity)> {
        self.modules
            .iter()
            .flat_map(|m| m.entities.iter().map(move |e| (m, e)))
    }

    /// Check structural well-formedness.
    pub fn validate(&self) -> Result<()> {
        for (module, entity) in self.entities() {
            if module.name.trim().is_empty() {
                return Err(TightenError::Model("module with blank name".to_string()));
            }
            if entity.schema.trim().is_empty() || entity.table.trim().is_empty() {
                return Err(TightenError::Model(format!(
                    "entity '{}' in module '{}' has a blank schema or table",
                    entity.name, module.name
                )));
            }
            if let Some(attr) = entity.attributes.iter().find(|a| a.column.trim().is_empty()) {
                return Err(TightenError::Model(format!(
                    "attribute '{}' of entity '{}' has a blank column",
                    attr.name, entity.name
                )));
            }
            if let Some(index) = entity.indexes.iter().find(|i| i.columns.is_empty()) {
                return Err(TightenError::Model(format!(
                    "index '{}' of entity '{}' has no columns",
                    index.name, entity.name
                )));
            }
        }
        Ok(())
    }

    /// Number of coordinates the engine will evaluate.
    pub fn coordinate_count(&self) -> usize {
        self.entities()
            .map(|(_, e)| {
                e.attributes.len() + e.unique_indexes().count() + e.relationships.len()
            })
            .sum()
    }
}
