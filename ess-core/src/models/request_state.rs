use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::caller::CallerContext;
use super::documents::DocumentResult;
use super::resolution::ResolutionPath;
use super::structured::{AccessOutcome, DataNeed, QuerySpec, StructuredResult};
use super::transcript::Transcript;
use crate::errors::StageError;

/// The working object threaded through every stage of one pipeline run.
///
/// Fields only ever go from unset to set: every `set_*` call on a field that
/// already holds a value is refused and returns `false`. The first recorded
/// error is kept as the request error; later ones become diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestState {
    request_id: Uuid,
    question: String,
    transcript: Transcript,
    caller: CallerContext,
    path: Option<ResolutionPath>,
    data_need: Option<DataNeed>,
    access: Option<AccessOutcome>,
    query_spec: Option<QuerySpec>,
    generated_query: Option<String>,
    structured: Option<StructuredResult>,
    documents: Option<DocumentResult>,
    final_answer: Option<String>,
    error: Option<StageError>,
    diagnostics: Vec<StageError>,
}

fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl RequestState {
    pub fn new(question: impl Into<String>, transcript: Transcript, caller: CallerContext) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            question: question.into(),
            transcript,
            caller,
            path: None,
            data_need: None,
            access: None,
            query_spec: None,
            generated_query: None,
            structured: None,
            documents: None,
            final_answer: None,
            error: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn caller(&self) -> &CallerContext {
        &self.caller
    }

    pub fn path(&self) -> Option<ResolutionPath> {
        self.path
    }

    pub fn data_need(&self) -> Option<&DataNeed> {
        self.data_need.as_ref()
    }

    pub fn access(&self) -> Option<&AccessOutcome> {
        self.access.as_ref()
    }

    pub fn query_spec(&self) -> Option<&QuerySpec> {
        self.query_spec.as_ref()
    }

    /// Query text as produced by the generator, before the guard ran.
    pub fn generated_query(&self) -> Option<&str> {
        self.generated_query.as_deref()
    }

    pub fn structured(&self) -> Option<&StructuredResult> {
        self.structured.as_ref()
    }

    pub fn documents(&self) -> Option<&DocumentResult> {
        self.documents.as_ref()
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    pub fn error(&self) -> Option<&StageError> {
        self.error.as_ref()
    }

    pub fn diagnostics(&self) -> &[StageError] {
        &self.diagnostics
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn set_path(&mut self, path: ResolutionPath) -> bool {
        fill(&mut self.path, path)
    }

    pub fn set_data_need(&mut self, need: DataNeed) -> bool {
        fill(&mut self.data_need, need)
    }

    pub fn set_access(&mut self, outcome: AccessOutcome) -> bool {
        fill(&mut self.access, outcome)
    }

    pub fn set_query_spec(&mut self, spec: QuerySpec) -> bool {
        fill(&mut self.query_spec, spec)
    }

    pub fn set_generated_query(&mut self, query: impl Into<String>) -> bool {
        fill(&mut self.generated_query, query.into())
    }

    pub fn set_structured(&mut self, result: StructuredResult) -> bool {
        fill(&mut self.structured, result)
    }

    pub fn set_documents(&mut self, result: DocumentResult) -> bool {
        fill(&mut self.documents, result)
    }

    pub fn set_final_answer(&mut self, answer: impl Into<String>) -> bool {
        fill(&mut self.final_answer, answer.into())
    }

    /// Record a failure that stops composition. Only the first sticks; any
    /// later one is kept as a diagnostic.
    pub fn record_error(&mut self, error: StageError) {
        if self.error.is_none() {
            self.error = Some(error);
        } else {
            self.diagnostics.push(error);
        }
    }

    /// Record a failure the pipeline degraded around.
    pub fn record_diagnostic(&mut self, error: StageError) {
        self.diagnostics.push(error);
    }
}
