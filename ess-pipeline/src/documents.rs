//! Document-lookup stage: standalone search phrase, then top-k passages.
//! Nothing here can fail a request; index trouble degrades to no passages.

use std::sync::Arc;

use ess_core::config::DocumentConfig;
use ess_core::models::{DocumentResult, RequestState};
use ess_core::traits::{IDocumentIndex, ITextGenerator};
use ess_core::{StageError, StageErrorKind};
use tracing::{debug, warn};

use crate::prompts;

pub struct DocumentLookupStage {
    generator: Arc<dyn ITextGenerator>,
    index: Arc<dyn IDocumentIndex>,
    config: DocumentConfig,
    history_window: usize,
}

impl DocumentLookupStage {
    pub fn new(
        generator: Arc<dyn ITextGenerator>,
        index: Arc<dyn IDocumentIndex>,
        config: DocumentConfig,
        history_window: usize,
    ) -> Self {
        Self {
            generator,
            index,
            config,
            history_window,
        }
    }

    /// No-op unless the path needs documents and no error is recorded.
    pub fn run(&self, state: &mut RequestState) {
        if state.has_error() || !state.path().is_some_and(|p| p.needs_documents()) {
            return;
        }

        let phrase = self.search_phrase(state);
        let result = self.search(state, phrase);
        state.set_documents(result);
    }

    fn search_phrase(&self, state: &mut RequestState) -> String {
        let history = state.transcript().render(self.history_window);
        let prompt = prompts::rephrase(state.question(), &history);
        match self.generator.generate(&prompt) {
            Ok(text) if !text.trim().is_empty() => {
                let phrase = text.trim().trim_matches('"').trim().to_string();
                debug!(phrase = %phrase, "rephrased search query");
                phrase
            }
            Ok(_) => {
                state.record_diagnostic(StageError::malformed("empty rephrase, using question"));
                state.question().to_string()
            }
            Err(err) => {
                warn!(error = %err, "rephrase failed, using question");
                state.record_diagnostic(StageError::from(err));
                state.question().to_string()
            }
        }
    }

    fn search(&self, state: &mut RequestState, phrase: String) -> DocumentResult {
        if !self.index.is_available() {
            state.record_diagnostic(StageError::new(
                StageErrorKind::DocumentIndexUnavailable,
                format!("{} reports unavailable", self.index.name()),
            ));
            return DocumentResult {
                phrase,
                hits: Vec::new(),
            };
        }

        match self.index.search(&phrase, self.config.top_k) {
            Ok(mut hits) => {
                hits.retain(|h| h.score >= self.config.min_score);
                hits.truncate(self.config.top_k);
                debug!(hits = hits.len(), "policy passages retrieved");
                DocumentResult { phrase, hits }
            }
            Err(err) => {
                warn!(error = %err, "document search failed");
                state.record_diagnostic(StageError::from(err));
                DocumentResult {
                    phrase,
                    hits: Vec::new(),
                }
            }
        }
    }
}
