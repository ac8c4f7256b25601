//! Flat string-keyed view of a policy for telemetry.
//!
//! [`FlatKey`] is the one place that maps telemetry key names to typed
//! fields. Nothing inside the engine looks settings up by string.

use indexmap::IndexMap;

use crate::error::{Result, TightenError};

use super::PolicyConfig;

/// Every exported policy key, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatKey {
    Mode,
    NullBudget,
    FkEnableCreation,
    FkAllowCrossSchema,
    FkAllowCrossCatalog,
    FkTreatMissingDeleteRuleAsIgnore,
    FkAllowNoCheckCreation,
    UniqueEnforceSingleColumn,
    UniqueEnforceMultiColumn,
    RemediationGeneratePreScripts,
    RemediationMaxRowsDefaultBackfill,
    SentinelNumeric,
    SentinelText,
    SentinelTemporal,
    SentinelBoolean,
}

impl FlatKey {
    pub fn all() -> &'static [FlatKey] {
        &[
            FlatKey::Mode,
            FlatKey::NullBudget,
            FlatKey::FkEnableCreation,
            FlatKey::FkAllowCrossSchema,
            FlatKey::FkAllowCrossCatalog,
            FlatKey::FkTreatMissingDeleteRuleAsIgnore,
            FlatKey::FkAllowNoCheckCreation,
            FlatKey::UniqueEnforceSingleColumn,
            FlatKey::UniqueEnforceMultiColumn,
            FlatKey::RemediationGeneratePreScripts,
            FlatKey::RemediationMaxRowsDefaultBackfill,
            FlatKey::SentinelNumeric,
            FlatKey::SentinelText,
            FlatKey::SentinelTemporal,
            FlatKey::SentinelBoolean,
        ]
    }

    /// Telemetry key name.
    pub fn key(&self) -> &'static str {
        match self {
            FlatKey::Mode => "policy.mode",
            FlatKey::NullBudget => "policy.nullBudget",
            FlatKey::FkEnableCreation => "foreignKeys.enableCreation",
            FlatKey::FkAllowCrossSchema => "foreignKeys.allowCrossSchema",
            FlatKey::FkAllowCrossCatalog => "foreignKeys.allowCrossCatalog",
            FlatKey::FkTreatMissingDeleteRuleAsIgnore => {
                "foreignKeys.treatMissingDeleteRuleAsIgnore"
            }
            FlatKey::FkAllowNoCheckCreation => "foreignKeys.allowNoCheckCreation",
            FlatKey::UniqueEnforceSingleColumn => "uniqueness.enforceSingleColumnUnique",
            FlatKey::UniqueEnforceMultiColumn => "uniqueness.enforceMultiColumnUnique",
            FlatKey::RemediationGeneratePreScripts => "remediation.generatePreScripts",
            FlatKey::RemediationMaxRowsDefaultBackfill => "remediation.maxRowsDefaultBackfill",
            FlatKey::SentinelNumeric => "remediation.sentinels.numeric",
            FlatKey::SentinelText => "remediation.sentinels.text",
            FlatKey::SentinelTemporal => "remediation.sentinels.date",
            FlatKey::SentinelBoolean => "remediation.sentinels.boolean",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.key() == key)
    }

    /// Read the field as text.
    pub fn get(&self, policy: &PolicyConfig) -> String {
        let fk = &policy.foreign_keys;
        let remediation = &policy.remediation;
        match self {
            FlatKey::Mode => policy.mode.label().to_string(),
            FlatKey::NullBudget => policy.null_budget.to_string(),
            FlatKey::FkEnableCreation => fk.enable_creation.to_string(),
            FlatKey::FkAllowCrossSchema => fk.allow_cross_schema.to_string(),
            FlatKey::FkAllowCrossCatalog => fk.allow_cross_catalog.to_string(),
            FlatKey::FkTreatMissingDeleteRuleAsIgnore => {
                fk.treat_missing_delete_rule_as_ignore.to_string()
            }
            FlatKey::FkAllowNoCheckCreation => fk.allow_no_check_creation.to_string(),
            FlatKey::UniqueEnforceSingleColumn => {
                policy.uniqueness.enforce_single_column.to_string()
            }
            FlatKey::UniqueEnforceMultiColumn => policy.uniqueness.enforce_multi_column.to_string(),
            FlatKey::RemediationGeneratePreScripts => remediation.generate_pre_scripts.to_string(),
            FlatKey::RemediationMaxRowsDefaultBackfill => {
                remediation.max_rows_default_backfill.to_string()
            }
            FlatKey::SentinelNumeric => remediation.sentinels.numeric.clone(),
            FlatKey::SentinelText => remediation.sentinels.text.clone(),
            FlatKey::SentinelTemporal => remediation.sentinels.temporal.clone(),
            FlatKey::SentinelBoolean => remediation.sentinels.boolean.clone(),
        }
    }

    /// Parse `value` into the field.
    pub fn set(&self, policy: &mut PolicyConfig, value: &str) -> Result<()> {
        let fk = &mut policy.foreign_keys;
        let remediation = &mut policy.remediation;
        match self {
            FlatKey::Mode => policy.mode = value.parse()?,
            FlatKey::NullBudget => policy.null_budget = parse(self, value)?,
            FlatKey::FkEnableCreation => fk.enable_creation = parse(self, value)?,
            FlatKey::FkAllowCrossSchema => fk.allow_cross_schema = parse(self, value)?,
            FlatKey::FkAllowCrossCatalog => fk.allow_cross_catalog = parse(self, value)?,
            FlatKey::FkTreatMissingDeleteRuleAsIgnore => {
                fk.treat_missing_delete_rule_as_ignore = parse(self, value)?
            }
            FlatKey::FkAllowNoCheckCreation => fk.allow_no_check_creation = parse(self, value)?,
            FlatKey::UniqueEnforceSingleColumn => {
                policy.uniqueness.enforce_single_column = parse(self, value)?
            }
            FlatKey::UniqueEnforceMultiColumn => {
                policy.uniqueness.enforce_multi_column = parse(self, value)?
            }
            FlatKey::RemediationGeneratePreScripts => {
                remediation.generate_pre_scripts = parse(self, value)?
            }
            FlatKey::RemediationMaxRowsDefaultBackfill => {
                remediation.max_rows_default_backfill = parse(self, value)?
            }
            FlatKey::SentinelNumeric => remediation.sentinels.numeric = value.to_string(),
            FlatKey::SentinelText => remediation.sentinels.text = value.to_string(),
            FlatKey::SentinelTemporal => remediation.sentinels.temporal = value.to_string(),
            FlatKey::SentinelBoolean => remediation.sentinels.boolean = value.to_string(),
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &FlatKey, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        TightenError::Config(format!("invalid value '{}' for '{}'", value, key.key()))
    })
}

impl PolicyConfig {
    /// Export as an ordered flat map.
    pub fn to_flat_map(&self) -> IndexMap<String, String> {
        FlatKey::all()
            .iter()
            .map(|k| (k.key().to_string(), k.get(self)))
            .collect()
    }

    /// Rebuild a policy from a flat map. Missing keys keep their defaults;
    /// unknown keys and unparsable values are configuration errors.
    pub fn from_flat_map<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut policy = PolicyConfig::default_policy();
        for (key, value) in entries {
            let flat = FlatKey::from_key(key)
                .ok_or_else(|| TightenError::Config(format!("unknown policy key '{}'", key)))?;
            flat.set(&mut policy, value)?;
        }
        policy.validated()
    }
}
