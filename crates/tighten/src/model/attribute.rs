//! Attribute (column) declarations.

use serde::{Deserialize, Serialize};

use super::types::DataType;

/// A declared attribute of an entity, mapped to one physical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// Logical attribute name.
    pub name: String,
    /// Physical column name.
    pub column: String,
    /// Declared data type.
    #[serde(default)]
    pub data_type: DataType,
    /// Whether the model declares the attribute mandatory.
    #[serde(default)]
    pub is_mandatory: bool,
    /// Whether the attribute is the entity identifier.
    #[serde(default)]
    pub is_identifier: bool,
    /// Default value declared by the model, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Attribute {
    /// Create an optional attribute with an unknown type.
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            data_type: DataType::Unknown,
            is_mandatory: false,
            is_identifier: false,
            default_value: None,
        }
    }

    /// Set the data type.
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Mark as mandatory.
    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    /// Mark as the entity identifier. Identifiers are always mandatory.
    pub fn identifier(mut self) -> Self {
        self.is_identifier = true;
        self.is_mandatory = true;
        self
    }

    /// Set the declared default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}
