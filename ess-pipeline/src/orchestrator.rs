//! Pipeline: CLASSIFY → STRUCTURED_QUERY → DOCUMENT_LOOKUP → FUSE.
//!
//! One pass, no retries, no cycles. The session lock is held from the
//! transcript snapshot to the two-turn append, so turns from concurrent
//! requests on one session never interleave. An aborted request appends
//! nothing.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ess_access::FieldCatalog;
use ess_core::config::EssConfig;
use ess_core::errors::{EssError, EssResult};
use ess_core::models::{CallerContext, RequestState};
use ess_core::traits::{IDocumentIndex, IStructuredData, ITextGenerator};
use ess_core::StageErrorKind;
use ess_observability::{
    components, CollaboratorStatus, DegradationEvent, DegradationTracker, HealthReport,
    HealthReporter, HealthSnapshot, RequestLog, RequestLogEntry, RequestOutcome,
};
use ess_session::SessionStore;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::control::{RequestControl, Stage};
use crate::documents::DocumentLookupStage;
use crate::fusion::FusionStage;
use crate::structured::StructuredQueryStage;

/// The answer plus the finished request state, for diagnostics.
#[derive(Debug, Clone)]
pub struct HandledRequest {
    pub answer: String,
    pub outcome: RequestOutcome,
    pub state: RequestState,
}

pub struct Pipeline {
    generator: Arc<dyn ITextGenerator>,
    data: Arc<dyn IStructuredData>,
    documents: Arc<dyn IDocumentIndex>,
    config: EssConfig,
    sessions: SessionStore,
    classifier: Classifier,
    structured: StructuredQueryStage,
    lookup: DocumentLookupStage,
    fusion: FusionStage,
    /// Observability sinks. Both synchronise internally and are written once
    /// per request after the session lock is released; neither feeds back
    /// into any answer.
    request_log: RequestLog,
    degradation: DegradationTracker,
}

impl Pipeline {
    /// Build a pipeline over the three collaborators. Every backend column
    /// that isn't configured as basic is treated as restricted.
    pub fn new(
        config: EssConfig,
        generator: Arc<dyn ITextGenerator>,
        data: Arc<dyn IStructuredData>,
        documents: Arc<dyn IDocumentIndex>,
    ) -> Self {
        let mut catalog = FieldCatalog::from_config(&config.access);
        match data.columns() {
            Ok(columns) => catalog = catalog.with_known_columns(columns),
            Err(err) => warn!(error = %err, "column listing failed, using configured catalog only"),
        }

        let window = config.session.history_window;
        Self {
            classifier: Classifier::new(Arc::clone(&generator), window),
            structured: StructuredQueryStage::new(
                Arc::clone(&generator),
                Arc::clone(&data),
                catalog,
                config.structured.clone(),
                window,
            ),
            lookup: DocumentLookupStage::new(
                Arc::clone(&generator),
                Arc::clone(&documents),
                config.documents.clone(),
                window,
            ),
            fusion: FusionStage::new(Arc::clone(&generator), window),
            request_log: RequestLog::with_capacity(config.observability.request_log_capacity),
            degradation: DegradationTracker::with_capacity(
                config.observability.degradation_capacity,
            ),
            sessions: SessionStore::new(),
            generator,
            data,
            documents,
            config,
        }
    }

    pub fn config(&self) -> &EssConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn request_log(&self) -> &RequestLog {
        &self.request_log
    }

    pub fn degradation(&self) -> &DegradationTracker {
        &self.degradation
    }

    /// Control with the configured request timeout (0 disables it).
    pub fn default_control(&self) -> RequestControl {
        match self.config.session.request_timeout_secs {
            0 => RequestControl::new(),
            secs => RequestControl::with_timeout(Duration::from_secs(secs)),
        }
    }

    /// Answer `question` within `session_id`. Collaborator failures become
    /// degraded answers; only validation failures and aborts are errors.
    pub fn handle(
        &self,
        session_id: &str,
        question: &str,
        caller: Option<&CallerContext>,
    ) -> EssResult<String> {
        self.handle_with(session_id, question, caller, &self.default_control())
    }

    pub fn handle_with(
        &self,
        session_id: &str,
        question: &str,
        caller: Option<&CallerContext>,
        control: &RequestControl,
    ) -> EssResult<String> {
        self.handle_detailed(session_id, question, caller, control)
            .map(|handled| handled.answer)
    }

    pub fn handle_detailed(
        &self,
        session_id: &str,
        question: &str,
        caller: Option<&CallerContext>,
        control: &RequestControl,
    ) -> EssResult<HandledRequest> {
        let caller = caller.ok_or(EssError::MissingCallerContext)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(EssError::EmptyQuestion);
        }
        if session_id.trim().is_empty() {
            return Err(EssError::EmptySessionId);
        }

        let started = Instant::now();
        let session = self.sessions.session(session_id);
        let mut transcript = session.lock();
        let mut state = RequestState::new(question, transcript.clone(), caller.clone());
        let request_id = state.request_id();
        let span = ess_observability::request_span!(request_id, session_id, caller.role);
        let _entered = span.enter();

        let outcome = match self.run_stages(&mut state, control) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "request aborted, transcript untouched");
                return Err(err);
            }
        };

        let answer = state.final_answer().unwrap_or_default().to_string();
        transcript.record_exchange(question, answer.clone());
        drop(transcript);

        self.observe(&state, session_id, outcome, started.elapsed());
        info!(outcome = outcome.as_str(), "request handled");
        Ok(HandledRequest {
            answer,
            outcome,
            state,
        })
    }

    fn run_stages(
        &self,
        state: &mut RequestState,
        control: &RequestControl,
    ) -> EssResult<RequestOutcome> {
        let request_id = state.request_id();

        control.check(Stage::Classify)?;
        ess_observability::classify_span!(request_id).in_scope(|| self.classifier.run(state));

        let path = state.path();
        control.check(Stage::StructuredQuery)?;
        ess_observability::structured_span!(request_id, path)
            .in_scope(|| self.structured.run(state));

        control.check(Stage::DocumentLookup)?;
        ess_observability::documents_span!(request_id, path).in_scope(|| self.lookup.run(state));

        control.check(Stage::Fuse)?;
        Ok(ess_observability::fuse_span!(request_id, path).in_scope(|| self.fusion.run(state)))
    }

    /// Request log entry, degradation events for failed collaborators, and
    /// recovery for collaborators that answered.
    fn observe(
        &self,
        state: &RequestState,
        session_id: &str,
        outcome: RequestOutcome,
        latency: Duration,
    ) {
        self.request_log.record(RequestLogEntry::new(
            state.request_id(),
            session_id,
            state.path(),
            outcome,
            state.error().map(|e| e.kind),
            latency,
        ));

        let mut failed = BTreeSet::new();
        let tracker = &self.degradation;
        for err in state.error().into_iter().chain(state.diagnostics()) {
            let Some(component) = component_for(err.kind) else {
                continue;
            };
            if failed.insert(component) {
                tracker.record(DegradationEvent::new(
                    component,
                    err.detail.clone(),
                    fallback_for(err.kind),
                ));
            }
        }

        let mut used = vec![components::GENERATION];
        if state.access().is_some() || state.structured().is_some() {
            used.push(components::STRUCTURED_DATA);
        }
        if state.documents().is_some() {
            used.push(components::DOCUMENT_INDEX);
        }
        for component in used.into_iter().filter(|c| !failed.contains(c)) {
            tracker.mark_recovered(component);
        }
    }

    /// Current availability of every collaborator plus recent degradations.
    pub fn health(&self) -> HealthReport {
        let snapshot = HealthSnapshot {
            collaborators: vec![
                CollaboratorStatus {
                    component: components::GENERATION,
                    provider: self.generator.name().to_string(),
                    available: self.generator.is_available(),
                },
                CollaboratorStatus {
                    component: components::STRUCTURED_DATA,
                    provider: self.data.name().to_string(),
                    available: self.data.is_available(),
                },
                CollaboratorStatus {
                    component: components::DOCUMENT_INDEX,
                    provider: self.documents.name().to_string(),
                    available: self.documents.is_available(),
                },
            ],
        };
        HealthReporter::build(&snapshot, &self.degradation, &self.request_log)
    }
}

fn component_for(kind: StageErrorKind) -> Option<&'static str> {
    match kind {
        StageErrorKind::GenerationUnavailable => Some(components::GENERATION),
        StageErrorKind::StructuredDataUnavailable => Some(components::STRUCTURED_DATA),
        StageErrorKind::DocumentIndexUnavailable => Some(components::DOCUMENT_INDEX),
        StageErrorKind::AccessDenied | StageErrorKind::MalformedGeneratorOutput => None,
    }
}

fn fallback_for(kind: StageErrorKind) -> &'static str {
    match kind {
        StageErrorKind::GenerationUnavailable => "fixed apology or raw question",
        StageErrorKind::StructuredDataUnavailable => "fixed apology",
        StageErrorKind::DocumentIndexUnavailable => "empty passage set",
        StageErrorKind::AccessDenied | StageErrorKind::MalformedGeneratorOutput => "none",
    }
}
