use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::access::{AccessDecision, AccessReason, DataCategory};
use super::caller::SubjectCode;

/// One result row: column name to value.
pub type Row = Map<String, Value>;

/// Whose data the question is about, as the generator described it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum TargetRef {
    Myself,
    Named(String),
    MyReports,
    Organization,
}

/// The generator's (advisory) description of what data a question needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataNeed {
    pub intent: String,
    pub target: TargetRef,
    pub category: Option<DataCategory>,
    pub tables: Vec<String>,
    pub columns: Vec<String>,
}

/// An employee as resolved by the structured-data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub code: SubjectCode,
    pub name: String,
    pub supervisor: Option<SubjectCode>,
}

/// Row filter the generated query must apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "code")]
pub enum RowScope {
    /// Rows describing exactly this subject.
    Subject(SubjectCode),
    /// Rows whose supervisor is this subject.
    ReportsOf(SubjectCode),
    /// No row restriction.
    Unrestricted,
}

impl RowScope {
    /// The subject code the query text must mention, if any.
    pub fn required_code(&self) -> Option<&SubjectCode> {
        match self {
            Self::Subject(code) | Self::ReportsOf(code) => Some(code),
            Self::Unrestricted => None,
        }
    }
}

/// The role-safe request handed to query generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub intent: String,
    pub tables: Vec<String>,
    /// Requested columns already restricted to the permitted set.
    pub columns: Vec<String>,
    pub scope: RowScope,
    pub category: DataCategory,
    pub decision: AccessDecision,
    pub row_limit: usize,
}

/// How the structured stage's access check ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AccessOutcome {
    Authorized { decision: AccessDecision },
    Denied { reason: AccessReason },
    /// The named subject does not exist; nothing to evaluate.
    SubjectNotFound { reference: String },
}

impl AccessOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }
}

/// Rows returned for an authorized, guarded query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub query: String,
    pub rows: Vec<Row>,
    /// Rows were dropped to honour the row limit.
    pub truncated: bool,
}

impl StructuredResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render rows as one JSON object per line for prompts.
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| Value::Object(row.clone()).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
