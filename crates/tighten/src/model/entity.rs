//! Entity-level declarations: table identity, indexes and relationships.

use serde::{Deserialize, Serialize};

use super::attribute::Attribute;
use super::types::DeleteRule;

/// An index declared on an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    /// Physical index name.
    pub name: String,
    /// Whether the model declares the index unique.
    #[serde(default)]
    pub is_unique: bool,
    /// Participating physical columns, in key order.
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            is_unique: false,
            columns,
        }
    }

    /// Mark as unique.
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Whether the index spans more than one column.
    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// A reference from one of the entity's columns to another entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Constraint name the relationship would carry.
    pub name: String,
    /// Source physical column on this entity.
    pub column: String,
    /// Logical name of the referenced entity.
    pub target_entity: String,
    pub target_schema: String,
    pub target_table: String,
    pub target_column: String,
    /// Catalog (database) of the target when it lives outside this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_catalog: Option<String>,
    /// Declared delete rule. `None` when the model leaves it unspecified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_rule: Option<DeleteRule>,
}

/// A declared entity mapped to a physical table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Logical entity name.
    pub name: String,
    /// Physical schema.
    pub schema: String,
    /// Physical table name.
    pub table: String,
    /// Catalog (database) name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl Entity {
    /// Create an empty entity.
    pub fn new(
        name: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            table: table.into(),
            catalog: None,
            attributes: Vec::new(),
            indexes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Get an attribute by physical column name (case-insensitive).
    pub fn attribute_for_column(&self, column: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.column.eq_ignore_ascii_case(column))
    }

    /// Indexes the model declares unique.
    pub fn unique_indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(|i| i.is_unique)
    }

    /// Columns of the declared identifier.
    pub fn identifier_columns(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|a| a.is_identifier)
            .map(|a| a.column.as_str())
    }
}
