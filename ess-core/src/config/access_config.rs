use serde::{Deserialize, Serialize};

use super::defaults;

/// Field catalog used by the access evaluator and the query guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Columns visible to a manager for a direct report.
    pub basic_fields: Vec<String>,
    /// Columns visible only to the subject and HR admins. Columns the
    /// structured-data backend reports that are not basic are added to this
    /// set at runtime.
    pub restricted_fields: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            basic_fields: defaults::DEFAULT_BASIC_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            restricted_fields: defaults::DEFAULT_RESTRICTED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
