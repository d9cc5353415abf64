//! Non-fatal configuration problems found while building reports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::AccountGroup;

/// Registry inconsistency that excludes records from statements without
/// halting report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConfigurationWarning {
    /// Group type is not Asset/Liability/Equity/Revenue/Expense; the group is
    /// left out of every statement.
    #[error("group '{group}' has unrecognized type '{group_type}' and is excluded from statements")]
    #[serde(rename_all = "camelCase")]
    UnknownGroupType { group: String, group_type: String },

    /// Ledger points at a group that does not exist.
    #[error("ledger '{ledger}' references unknown group '{group}'")]
    MissingGroup { ledger: String, group: String },
}

impl ConfigurationWarning {
    pub fn unknown_group_type(group: &AccountGroup) -> Self {
        Self::UnknownGroupType {
            group: group.name.clone(),
            group_type: group.group_type.clone(),
        }
    }

    /// Emit this warning on the `tracing` pipeline.
    pub fn log(&self) {
        match self {
            Self::UnknownGroupType { group, group_type } => {
                tracing::warn!(%group, %group_type, "unrecognized group type; group excluded");
            }
            Self::MissingGroup { ledger, group } => {
                tracing::warn!(%ledger, %group, "ledger references unknown group");
            }
        }
    }
}
