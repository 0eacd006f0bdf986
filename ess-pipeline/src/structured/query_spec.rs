//! Building the role-safe query specification.

use ess_core::config::StructuredConfig;
use ess_core::models::{
    AccessDecision, CallerContext, DataCategory, DataNeed, QuerySpec, RowScope, Target,
};

/// Row filter for `target`.
pub fn row_scope(target: &Target, caller: &CallerContext) -> RowScope {
    match target {
        Target::Subject { code, .. } => RowScope::Subject(code.clone()),
        Target::DirectReports => RowScope::ReportsOf(caller.subject_code.clone()),
        Target::Organization => RowScope::Unrestricted,
    }
}

/// Requested columns are cut down to what `decision` permits.
pub fn build_query_spec(
    need: &DataNeed,
    target: &Target,
    caller: &CallerContext,
    category: DataCategory,
    decision: AccessDecision,
    row_limit: usize,
) -> QuerySpec {
    QuerySpec {
        intent: if need.intent.is_empty() {
            "answer the question".to_string()
        } else {
            need.intent.clone()
        },
        tables: need.tables.clone(),
        columns: decision.permitted.restrict(&need.columns),
        scope: row_scope(target, caller),
        category,
        decision,
        row_limit,
    }
}

/// The row filter as an instruction for query generation.
pub fn describe_row_scope(scope: &RowScope, config: &StructuredConfig) -> String {
    match scope {
        RowScope::Subject(code) => format!(
            "only rows for {column} = {code} (join through {column} for other tables)",
            column = config.code_column,
        ),
        RowScope::ReportsOf(code) => format!(
            "only employees whose {supervisor} = {code} (join through {column} for other tables)",
            supervisor = config.supervisor_column,
            column = config.code_column,
        ),
        RowScope::Unrestricted => "none required".to_string(),
    }
}
