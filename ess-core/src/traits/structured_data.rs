use crate::errors::StructuredDataError;
use crate::models::{Row, SubjectCode, SubjectRecord};

/// Read-only structured HR data backend.
pub trait IStructuredData: Send + Sync {
    /// Human-readable schema description handed to query generation.
    fn describe_schema(&self) -> Result<String, StructuredDataError>;

    /// Execute an already-guarded read-only query.
    fn execute(&self, query: &str) -> Result<Vec<Row>, StructuredDataError>;

    /// Execute an already-guarded query that can only see rows belonging to
    /// `subjects`. Every table the query reads is narrowed before the query
    /// text runs; an empty slice sees no rows at all.
    fn execute_scoped(
        &self,
        query: &str,
        subjects: &[SubjectCode],
    ) -> Result<Vec<Row>, StructuredDataError>;

    /// Employees whose supervisor is `supervisor`.
    fn direct_reports(&self, supervisor: &SubjectCode) -> Result<Vec<SubjectRecord>, StructuredDataError>;

    /// Look up an employee by code or by name. `Ok(None)` when nobody matches.
    fn resolve_subject(&self, reference: &str) -> Result<Option<SubjectRecord>, StructuredDataError>;

    /// Query dialect, e.g. `SQLite`.
    fn dialect(&self) -> &str;

    /// Every column name the backend exposes. Used to widen the restricted
    /// field catalog; backends that cannot enumerate return an empty list.
    fn columns(&self) -> Result<Vec<String>, StructuredDataError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }
}
