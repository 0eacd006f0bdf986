//! Fixed instruction templates for every generator call.
//!
//! Each template opens with a distinct marker line (see [`markers`]) so logs
//! and scripted generators can tell the calls apart.

use ess_core::constants::{ASSISTANT_PERSONA, NOT_AUTHORIZED};
use ess_core::models::{CallerContext, FieldSet, QuerySpec};

/// First line of each template.
pub mod markers {
    pub const CLASSIFY: &str = "You are a query classifier for an HR assistant.";
    pub const DATA_NEED: &str = "You analyse HR questions and describe the data needed to answer them.";
    pub const QUERY: &str = "You are an expert SQL query generator for an Employee Self-Service HR assistant.";
    pub const REPHRASE: &str = "Rephrase the follow-up question as a standalone policy search query.";
    pub const STRUCTURED_ANSWER: &str = "Answer the user's question from the database result below.";
    pub const DOCUMENT_ANSWER: &str = "Answer the user's question from the HR policy context below.";
    pub const SUMMARY: &str = "Explain what the database result below tells us.";
    pub const HYBRID_ANSWER: &str = "Compose one answer from the database and policy information below.";
}

fn history_or_none(history: &str) -> &str {
    if history.trim().is_empty() {
        "(none)"
    } else {
        history
    }
}

pub fn classify(question: &str, history: &str) -> String {
    format!(
        r#"{marker}
Classify the user's question into exactly one of these categories:

1. DATABASE - asks for employee-specific data only.
   Examples:
   - "How many earned leaves do I have?"
   - "What is my designation?"
   - "Show Neha Reddy's salary slip for June"

2. POLICY - asks about HR policies or procedures, no data lookup needed.
   Examples:
   - "What is the paternity leave policy?"
   - "Can interns get LTA?"
   - "What are the conditions for getting a bonus?"
   - "What are the working hours?"

3. HYBRID - needs both personal data and HR policy to answer.
   Examples:
   - "Am I eligible for maternity leave?" (needs gender, employment status and policy)
   - "Can I take sick leave tomorrow?" (needs leave balance and rules)
   - "Why didn't Neha Reddy get a bonus this year?" (needs salary data and bonus rules)
   - "Is Neha eligible for paid leaves?" (needs employment status and leave policy)

Return only one of these values exactly: DATABASE, POLICY, HYBRID

Chat History:
{history}

Question: {question}"#,
        marker = markers::CLASSIFY,
        history = history_or_none(history),
    )
}

pub fn data_need(question: &str, history: &str, caller: &CallerContext, schema: &str) -> String {
    format!(
        r#"{marker}
Use the chat history to resolve pronouns and implied people.

User role: {role}
Employee code: {code}

Access rules:
- employee: may read only their own data.
- manager: may read their own data, and for direct reports ONLY leave balances,
  leave requests and basic employee info (name, department, designation,
  employment status). Never salary, contact details or personal identifiers.
- hr_admin: may read all employee data.

Available tables and columns:
{schema}

Reply with one JSON object and nothing else:
{{
  "intent": "<short description of what is being asked>",
  "target_kind": "self" | "named" | "direct_reports" | "organization",
  "target_name": "<employee name or code when target_kind is named, else null>",
  "category": "SELF_DATA" | "DIRECT_REPORT_BASIC" | "DIRECT_REPORT_RESTRICTED" | "ORG_WIDE",
  "tables": ["<table>", ...],
  "columns": ["<column>", ...]
}}

Chat History:
{history}

Question: {question}"#,
        marker = markers::DATA_NEED,
        role = caller.role,
        code = caller.subject_code,
        history = history_or_none(history),
    )
}

fn describe_columns(spec: &QuerySpec) -> String {
    match &spec.decision.permitted {
        FieldSet::All if spec.columns.is_empty() => {
            "Any column in the schema that is needed to answer the question.".to_string()
        }
        FieldSet::All => format!("Prefer these columns: {}", spec.columns.join(", ")),
        FieldSet::Only(fields) => {
            let allowed: Vec<&str> = fields.iter().map(String::as_str).collect();
            let mut text = format!(
                "You may ONLY reference these columns: {}",
                allowed.join(", ")
            );
            if !spec.columns.is_empty() {
                text.push_str(&format!("\nPrefer these columns: {}", spec.columns.join(", ")));
            }
            text
        }
        FieldSet::Nothing => "No columns may be read.".to_string(),
    }
}

pub fn query(
    question: &str,
    history: &str,
    spec: &QuerySpec,
    schema: &str,
    dialect: &str,
    row_filter: &str,
) -> String {
    let tables = if spec.tables.is_empty() {
        "Choose from the schema.".to_string()
    } else {
        spec.tables.join(", ")
    };
    format!(
        r#"{marker}
Write one read-only {dialect} query that answers the question.

Intent: {intent}
Tables: {tables}
Columns: {columns}
Row filter: {row_filter}
Return at most {limit} rows.

Rules:
- Only use the tables and columns in the schema below. Never guess names.
- Never use SELECT *. Select only the columns needed.
- Exactly one SELECT statement. No writes, no DDL.

Schema:
{schema}

Reply with one JSON object and nothing else: {{"query": "<the query>"}}

Chat History:
{history}

Question: {question}"#,
        marker = markers::QUERY,
        intent = spec.intent,
        columns = describe_columns(spec),
        limit = spec.row_limit,
        history = history_or_none(history),
    )
}

pub fn rephrase(question: &str, history: &str) -> String {
    format!(
        r#"{marker}
Focus on the core subject of the question. Reply with the search query only.

Conversation History:
{history}

Follow-up Question:
{question}

Rephrased Search Query:"#,
        marker = markers::REPHRASE,
        history = history_or_none(history),
    )
}

pub fn structured_answer(question: &str, history: &str, query: &str, rows: &str) -> String {
    format!(
        r#"{marker}
{persona}
Write a clear, friendly and brief response in natural language.
Only use the data present in the result. Do not assume, speculate or fabricate.

Chat History:
{history}

Question: {question}
Query: {query}
Result:
{rows}"#,
        marker = markers::STRUCTURED_ANSWER,
        persona = ASSISTANT_PERSONA,
        history = history_or_none(history),
    )
}

pub fn document_answer(question: &str, history: &str, passages: &str) -> String {
    format!(
        r#"{marker}
{persona}
Answer clearly and professionally using only the policy context.

Chat History:
{history}

Question: {question}
Policy Info:
{passages}"#,
        marker = markers::DOCUMENT_ANSWER,
        persona = ASSISTANT_PERSONA,
        history = history_or_none(history),
    )
}

/// Intermediate call turning rows into prose for a HYBRID answer.
pub fn structured_summary(question: &str, history: &str, query: &str, rows: &str) -> String {
    format!(
        r#"{marker}
{persona}
The question may involve both employee data and company policy. You only have
the database result. Do not answer the full question yet; this is a partial
answer. Only summarise the actual result.

Chat History:
{history}

Question: {question}
Query: {query}
Result:
{rows}"#,
        marker = markers::SUMMARY,
        persona = ASSISTANT_PERSONA,
        history = history_or_none(history),
    )
}

pub fn hybrid_answer(question: &str, history: &str, data: &str, policy: &str) -> String {
    format!(
        r#"{marker}
{persona}
Write a complete and brief answer. If one source is missing, say so and use
the available one. If the data section says the user is not authorized, tell
them politely that they may not see that data ("{refusal}").

Chat History:
{history}

Question: {question}
Database info: {data}
Policy Info:
{policy}"#,
        marker = markers::HYBRID_ANSWER,
        persona = ASSISTANT_PERSONA,
        refusal = NOT_AUTHORIZED,
        history = history_or_none(history),
    )
}
