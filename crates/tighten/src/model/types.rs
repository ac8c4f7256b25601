//! Core type definitions for declared schema intent.

use serde::{Deserialize, Serialize};

/// Declared data type of a model attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Surrogate identifier (auto-number or reference).
    Identifier,
    Integer,
    LongInteger,
    Decimal,
    Currency,
    Boolean,
    Text,
    Email,
    PhoneNumber,
    Date,
    Time,
    DateTime,
    BinaryData,
    /// Unrecognised upstream type.
    #[default]
    Unknown,
}

impl DataType {
    /// Category used to pick a remediation sentinel.
    pub fn category(&self) -> DataCategory {
        match self {
            DataType::Identifier
            | DataType::Integer
            | DataType::LongInteger
            | DataType::Decimal
            | DataType::Currency => DataCategory::Numeric,
            DataType::Text | DataType::Email | DataType::PhoneNumber => DataCategory::Text,
            DataType::Date | DataType::Time | DataType::DateTime => DataCategory::Temporal,
            DataType::Boolean => DataCategory::Boolean,
            DataType::BinaryData | DataType::Unknown => DataCategory::Other,
        }
    }
}

/// Broad data category, one sentinel literal per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Numeric,
    Text,
    Temporal,
    Boolean,
    /// No safe sentinel exists (binary payloads, unknown types).
    Other,
}

/// Delete rule declared on a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRule {
    /// Deleting the parent is blocked while children exist.
    Protect,
    /// Deleting the parent cascades to children.
    Delete,
    /// The model does not enforce the reference.
    Ignore,
}

impl DeleteRule {
    /// Whether the model itself enforces referential integrity.
    pub fn is_enforced(&self) -> bool {
        matches!(self, DeleteRule::Protect | DeleteRule::Delete)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeleteRule::Protect => "Protect",
            DeleteRule::Delete => "Delete",
            DeleteRule::Ignore => "Ignore",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(DataType::Currency.category(), DataCategory::Numeric);
        assert_eq!(DataType::Email.category(), DataCategory::Text);
        assert_eq!(DataType::DateTime.category(), DataCategory::Temporal);
        assert_eq!(DataType::BinaryData.category(), DataCategory::Other);
    }

    #[test]
    fn test_unknown_is_default_type() {
        assert_eq!(DataType::default(), DataType::Unknown);
        assert_eq!(DataType::default().category(), DataCategory::Other);
    }

    #[test]
    fn test_delete_rule_enforcement() {
        assert!(DeleteRule::Protect.is_enforced());
        assert!(DeleteRule::Delete.is_enforced());
        assert!(!DeleteRule::Ignore.is_enforced());
    }
}
