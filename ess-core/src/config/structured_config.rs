use serde::{Deserialize, Serialize};

use super::defaults;

/// Structured-data stage and reference store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredConfig {
    /// Maximum rows kept from a single query result.
    pub max_rows: usize,
    /// Table holding one row per employee.
    pub employees_table: String,
    /// Column holding the subject code.
    pub code_column: String,
    /// Column holding the display name.
    pub name_column: String,
    /// Column holding the supervisor's subject code.
    pub supervisor_column: String,
}

impl Default for StructuredConfig {
    fn default() -> Self {
        Self {
            max_rows: defaults::DEFAULT_MAX_ROWS,
            employees_table: defaults::DEFAULT_EMPLOYEES_TABLE.to_string(),
            code_column: defaults::DEFAULT_CODE_COLUMN.to_string(),
            name_column: defaults::DEFAULT_NAME_COLUMN.to_string(),
            supervisor_column: defaults::DEFAULT_SUPERVISOR_COLUMN.to_string(),
        }
    }
}
