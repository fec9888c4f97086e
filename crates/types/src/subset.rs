//! Command subsets: named groupings of catalog commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix reserved for user-created subset identifiers.
pub const CUSTOM_SUBSET_PREFIX: &str = "custom_";

/// Creator recorded on predefined subsets.
pub const SYSTEM_CREATOR: &str = "system";

/// A named grouping of command identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSubset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub command_ids: Vec<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CommandSubset {
    pub fn is_custom(&self) -> bool {
        is_custom_subset_id(&self.id)
    }

    pub fn contains(&self, command_id: &str) -> bool {
        self.command_ids.iter().any(|id| id == command_id)
    }
}

pub fn is_custom_subset_id(id: &str) -> bool {
    id.starts_with(CUSTOM_SUBSET_PREFIX)
}

/// User input for a new custom subset; id, creator and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub command_ids: Vec<String>,
}

/// Partial update applied to an existing custom subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub command_ids: Option<Vec<String>>,
}

impl SubsetPatch {
    pub fn apply_to(self, subset: &mut CommandSubset) {
        if let Some(name) = self.name {
            subset.name = name;
        }
        if let Some(description) = self.description {
            subset.description = description;
        }
        if let Some(command_ids) = self.command_ids {
            subset.command_ids = command_ids;
        }
    }
}
