//! Pulling structured values out of free-form generator text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use ess_core::models::{DataCategory, DataNeed, TargetRef};
use ess_core::StageError;

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").ok());

/// The contents of the first fenced code block, or the whole text trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| text.trim())
}

/// The first balanced `{...}` span in `text`, ignoring braces inside JSON
/// strings.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DataNeedWire {
    intent: String,
    target_kind: String,
    target_name: Option<String>,
    category: Option<String>,
    tables: Vec<String>,
    columns: Vec<String>,
}

impl Default for DataNeedWire {
    fn default() -> Self {
        Self {
            intent: String::new(),
            target_kind: "self".to_string(),
            target_name: None,
            category: None,
            tables: Vec::new(),
            columns: Vec::new(),
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse the data-need description. An unknown category is dropped (the
/// catalog-implied one applies); an unknown target kind is malformed.
pub fn parse_data_need(text: &str) -> Result<DataNeed, StageError> {
    let json = first_json_object(strip_code_fence(text))
        .ok_or_else(|| StageError::malformed("data need: no JSON object in generator output"))?;
    let wire: DataNeedWire = serde_json::from_str(json)
        .map_err(|e| StageError::malformed(format!("data need: {e}")))?;

    let name = wire
        .target_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case("null"));
    let target = match wire.target_kind.trim().to_ascii_lowercase().as_str() {
        "self" | "me" | "myself" | "" => TargetRef::Myself,
        "named" | "person" | "employee" => match name {
            Some(n) => TargetRef::Named(n),
            None => return Err(StageError::malformed("data need: named target without a name")),
        },
        "direct_reports" | "team" | "reports" => TargetRef::MyReports,
        "organization" | "organisation" | "org" | "org_wide" => TargetRef::Organization,
        other => {
            return Err(StageError::malformed(format!(
                "data need: unknown target kind `{other}`"
            )))
        }
    };

    Ok(DataNeed {
        intent: wire.intent.trim().to_string(),
        target,
        category: wire.category.as_deref().and_then(DataCategory::from_label),
        tables: clean_list(wire.tables),
        columns: clean_list(wire.columns),
    })
}

#[derive(Debug, Deserialize)]
struct QueryWire {
    query: String,
}

/// The query text: the `query` field of a JSON object when present,
/// otherwise the fenced or raw text.
pub fn extract_query(text: &str) -> Result<String, StageError> {
    let body = strip_code_fence(text);
    let query = match first_json_object(body).map(serde_json::from_str::<QueryWire>) {
        Some(Ok(wire)) => wire.query,
        _ => body.to_string(),
    };
    let query = query.trim();
    if query.is_empty() {
        return Err(StageError::malformed("query generation returned no text"));
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_is_stripped() {
        assert_eq!(strip_code_fence("```sql\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(strip_code_fence("here:\n```\n{\"a\":1}\n```\nthanks"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  plain  "), "plain");
    }

    #[test]
    fn first_object_skips_braces_in_strings() {
        let text = r#"Sure! {"query": "SELECT '}' FROM t"} trailing {"x":1}"#;
        assert_eq!(first_json_object(text), Some(r#"{"query": "SELECT '}' FROM t"}"#));
        assert_eq!(first_json_object("no json"), None);
        assert_eq!(first_json_object("{ unbalanced"), None);
    }

    #[test]
    fn nested_objects_are_kept_whole() {
        assert_eq!(first_json_object(r#"{"a":{"b":2}} x"#), Some(r#"{"a":{"b":2}}"#));
    }

    #[test]
    fn data_need_targets() {
        let need = parse_data_need(
            r#"{"intent":"salary","target_kind":"named","target_name":"Neha","category":"DIRECT_REPORT_RESTRICTED","tables":["salary_summary"],"columns":["net_salary"]}"#,
        )
        .unwrap();
        assert_eq!(need.target, TargetRef::Named("Neha".into()));
        assert_eq!(need.category, Some(DataCategory::DirectReportRestricted));

        let need = parse_data_need(r#"{"intent":"team","target_kind":"team"}"#).unwrap();
        assert_eq!(need.target, TargetRef::MyReports);
        assert_eq!(need.category, None);

        let need = parse_data_need(r#"{"intent":"me"}"#).unwrap();
        assert_eq!(need.target, TargetRef::Myself);
    }

    #[test]
    fn data_need_rejects_garbage() {
        assert!(parse_data_need("I cannot help with that").is_err());
        assert!(parse_data_need(r#"{"target_kind":"martian"}"#).is_err());
        assert!(parse_data_need(r#"{"target_kind":"named","target_name":null}"#).is_err());
    }

    #[test]
    fn query_from_json_fence_or_raw() {
        assert_eq!(extract_query(r#"{"query": "SELECT 1"}"#).unwrap(), "SELECT 1");
        assert_eq!(extract_query("```sql\nSELECT 2;\n```").unwrap(), "SELECT 2;");
        assert_eq!(extract_query("SELECT 3").unwrap(), "SELECT 3");
        assert!(extract_query("   ").is_err());
        assert!(extract_query(r#"{"query": ""}"#).is_err());
    }
}
