//! Physical identities shared by evidence and decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TightenError};

/// Fully qualified physical column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    /// Check every component is non-blank and already trimmed.
    pub fn validate(&self) -> Result<()> {
        check_identifier("schema", &self.schema)?;
        check_identifier("table", &self.table)?;
        check_identifier("column", &self.column)
    }

    /// Case-insensitive lookup key.
    pub(crate) fn key(&self) -> String {
        lookup_key(&[&self.schema, &self.table, &self.column])
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

pub(crate) fn check_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.trim().is_empty() {
        return Err(TightenError::Evidence(format!("{} identifier is blank", kind)));
    }
    if value.trim() != value {
        return Err(TightenError::Evidence(format!(
            "{} identifier '{}' has surrounding whitespace",
            kind, value
        )));
    }
    Ok(())
}

/// Join identifier parts into an upper-cased key. SQL Server identifiers
/// compare case-insensitively under the default collation.
pub(crate) fn lookup_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_untrimmed() {
        assert!(ColumnRef::new("dbo", "T", "C").validate().is_ok());
        assert!(ColumnRef::new("dbo", " T", "C").validate().is_err());
        assert!(ColumnRef::new("dbo", "T", "").validate().is_err());
    }

    #[test]
    fn test_key_ignores_case() {
        assert_eq!(
            ColumnRef::new("dbo", "osusr_a", "id").key(),
            ColumnRef::new("DBO", "OSUSR_A", "ID").key()
        );
    }
}
