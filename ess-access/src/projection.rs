use ess_core::models::{FieldSet, Row, SubjectCode};
use serde_json::Value;

use crate::catalog::FieldCatalog;

/// Drop every catalogued column outside `permitted` from each row.
/// Uncatalogued keys (aliases, aggregates) pass through. Returns the number of
/// values removed.
pub fn project_rows(rows: &mut [Row], permitted: &FieldSet, catalog: &FieldCatalog) -> usize {
    if permitted.is_all() {
        return 0;
    }
    let mut removed = 0;
    for row in rows.iter_mut() {
        let before = row.len();
        row.retain(|key, _| !catalog.is_catalogued(key) || permitted.permits(key));
        removed += before - row.len();
    }
    removed
}

/// Drop every row whose `code_column` value names a subject outside
/// `subjects`. Rows that do not expose the column are kept; the backend has
/// already narrowed what they were read from. Returns the number of rows
/// dropped.
pub fn retain_in_scope(rows: &mut Vec<Row>, code_column: &str, subjects: &[SubjectCode]) -> usize {
    let before = rows.len();
    rows.retain(|row| {
        let Some(value) = row
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code_column))
            .map(|(_, value)| value)
        else {
            return true;
        };
        let code = match value {
            Value::String(text) => text.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return false,
        };
        subjects.iter().any(|s| s.as_str() == code)
    });
    before - rows.len()
}
