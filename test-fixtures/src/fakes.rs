//! Fakes for every collaborator trait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ess_core::errors::{DocumentIndexError, GenerationError, StructuredDataError};
use ess_core::models::{DocumentHit, Row, SubjectCode, SubjectRecord};
use ess_core::traits::{IDocumentIndex, IStructuredData, ITextGenerator};

/// What a scripted rule answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Fail,
}

#[derive(Debug, Clone)]
struct Rule {
    needles: Vec<String>,
    reply: Reply,
}

/// Text generator driven by substring rules. The first rule whose needles
/// all occur in the prompt answers; every prompt is recorded.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    rules: Vec<Rule>,
    fallback: Option<Reply>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` when the prompt contains `needle`.
    pub fn on(self, needle: &str, text: &str) -> Self {
        self.on_all(&[needle], text)
    }

    /// Reply with `text` when the prompt contains every needle.
    pub fn on_all(mut self, needles: &[&str], text: &str) -> Self {
        self.rules.push(Rule {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            reply: Reply::Text(text.to_string()),
        });
        self
    }

    /// Fail with `Unavailable` when the prompt contains `needle`.
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.rules.push(Rule {
            needles: vec![needle.to_string()],
            reply: Reply::Fail,
        });
        self
    }

    /// Reply used when no rule matches. Without one, unmatched prompts fail.
    pub fn otherwise(mut self, text: &str) -> Self {
        self.fallback = Some(Reply::Text(text.to_string()));
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Number of recorded prompts containing `needle`.
    pub fn prompts_containing(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }

    /// The last recorded prompt containing `needle`.
    pub fn last_prompt_containing(&self, needle: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|p| p.contains(needle))
            .cloned()
    }
}

impl ITextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let reply = self
            .rules
            .iter()
            .find(|r| r.needles.iter().all(|n| prompt.contains(n.as_str())))
            .map(|r| r.reply.clone())
            .or_else(|| self.fallback.clone());
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail) => Err(GenerationError::Unavailable {
                provider: "scripted".into(),
                reason: "scripted failure".into(),
            }),
            None => Err(GenerationError::Unavailable {
                provider: "scripted".into(),
                reason: "no scripted reply".into(),
            }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Text generator backed by a closure.
pub struct FnGenerator<F> {
    f: F,
}

impl<F> FnGenerator<F>
where
    F: Fn(&str) -> Result<String, GenerationError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ITextGenerator for FnGenerator<F>
where
    F: Fn(&str) -> Result<String, GenerationError> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (self.f)(prompt)
    }

    fn name(&self) -> &str {
        "fn"
    }
}

/// Wraps a structured-data backend and records every executed query.
pub struct RecordingData {
    inner: Arc<dyn IStructuredData>,
    executed: Mutex<Vec<String>>,
    scopes: Mutex<Vec<Vec<String>>>,
    resolves: AtomicUsize,
}

impl RecordingData {
    pub fn new(inner: Arc<dyn IStructuredData>) -> Self {
        Self {
            inner,
            executed: Mutex::new(Vec::new()),
            scopes: Mutex::new(Vec::new()),
            resolves: AtomicUsize::new(0),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn execute_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    /// Subject codes of every scoped execution, in call order.
    pub fn scopes(&self) -> Vec<Vec<String>> {
        self.scopes.lock().unwrap().clone()
    }

    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

impl IStructuredData for RecordingData {
    fn describe_schema(&self) -> Result<String, StructuredDataError> {
        self.inner.describe_schema()
    }

    fn execute(&self, query: &str) -> Result<Vec<Row>, StructuredDataError> {
        self.executed.lock().unwrap().push(query.to_string());
        self.inner.execute(query)
    }

    fn execute_scoped(
        &self,
        query: &str,
        subjects: &[SubjectCode],
    ) -> Result<Vec<Row>, StructuredDataError> {
        self.executed.lock().unwrap().push(query.to_string());
        self.scopes
            .lock()
            .unwrap()
            .push(subjects.iter().map(|c| c.as_str().to_string()).collect());
        self.inner.execute_scoped(query, subjects)
    }

    fn direct_reports(&self, supervisor: &SubjectCode) -> Result<Vec<SubjectRecord>, StructuredDataError> {
        self.inner.direct_reports(supervisor)
    }

    fn resolve_subject(&self, reference: &str) -> Result<Option<SubjectRecord>, StructuredDataError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_subject(reference)
    }

    fn dialect(&self) -> &str {
        self.inner.dialect()
    }

    fn columns(&self) -> Result<Vec<String>, StructuredDataError> {
        self.inner.columns()
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

/// Structured-data backend that is always down.
#[derive(Debug, Default)]
pub struct FailingData;

impl IStructuredData for FailingData {
    fn describe_schema(&self) -> Result<String, StructuredDataError> {
        Err(StructuredDataError::Unavailable {
            reason: "backend down".into(),
        })
    }

    fn execute(&self, _query: &str) -> Result<Vec<Row>, StructuredDataError> {
        Err(StructuredDataError::Unavailable {
            reason: "backend down".into(),
        })
    }

    fn execute_scoped(
        &self,
        _query: &str,
        _subjects: &[SubjectCode],
    ) -> Result<Vec<Row>, StructuredDataError> {
        Err(StructuredDataError::Unavailable {
            reason: "backend down".into(),
        })
    }

    fn direct_reports(&self, _supervisor: &SubjectCode) -> Result<Vec<SubjectRecord>, StructuredDataError> {
        Err(StructuredDataError::Unavailable {
            reason: "backend down".into(),
        })
    }

    fn resolve_subject(&self, _reference: &str) -> Result<Option<SubjectRecord>, StructuredDataError> {
        Err(StructuredDataError::Unavailable {
            reason: "backend down".into(),
        })
    }

    fn dialect(&self) -> &str {
        "none"
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Document index that always reports itself down.
#[derive(Debug, Default)]
pub struct UnavailableIndex {
    searches: AtomicUsize,
}

impl UnavailableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl IDocumentIndex for UnavailableIndex {
    fn search(&self, _phrase: &str, _k: usize) -> Result<Vec<DocumentHit>, DocumentIndexError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Err(DocumentIndexError::Unavailable {
            reason: "index offline".into(),
        })
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Document index returning fixed hits and recording search phrases.
#[derive(Debug, Default)]
pub struct StaticIndex {
    hits: Vec<DocumentHit>,
    phrases: Mutex<Vec<(String, usize)>>,
}

impl StaticIndex {
    pub fn new(hits: Vec<DocumentHit>) -> Self {
        Self {
            hits,
            phrases: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// `(phrase, k)` for every search so far.
    pub fn searches(&self) -> Vec<(String, usize)> {
        self.phrases.lock().unwrap().clone()
    }
}

impl IDocumentIndex for StaticIndex {
    fn search(&self, phrase: &str, k: usize) -> Result<Vec<DocumentHit>, DocumentIndexError> {
        self.phrases.lock().unwrap().push((phrase.to_string(), k));
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}
