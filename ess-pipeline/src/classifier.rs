//! Classifier stage: one generator call, one label, one resolution path.

use std::sync::Arc;

use ess_core::models::{RequestState, ResolutionPath};
use ess_core::traits::ITextGenerator;
use ess_core::StageError;
use ess_observability::tracing_setup::events;
use tracing::{debug, warn};

use crate::prompts;

/// Path used when the label is unusable or the generator is down.
pub const FALLBACK_PATH: ResolutionPath = ResolutionPath::Structured;

pub struct Classifier {
    generator: Arc<dyn ITextGenerator>,
    history_window: usize,
}

impl Classifier {
    pub fn new(generator: Arc<dyn ITextGenerator>, history_window: usize) -> Self {
        Self {
            generator,
            history_window,
        }
    }

    /// Set the resolution path on `state`. Always sets a path.
    pub fn run(&self, state: &mut RequestState) {
        let history = state.transcript().render(self.history_window);
        let prompt = prompts::classify(state.question(), &history);

        let raw = match self.generator.generate(&prompt) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "classifier generator unavailable");
                state.record_error(StageError::from(err));
                state.set_path(FALLBACK_PATH);
                return;
            }
        };

        let path = match ResolutionPath::from_label(&raw) {
            Some(path) => path,
            None => {
                events::label_fallback(state.request_id(), raw.trim(), FALLBACK_PATH.label());
                state.record_diagnostic(StageError::malformed(format!(
                    "unrecognised classifier label `{}`",
                    raw.trim()
                )));
                FALLBACK_PATH
            }
        };
        debug!(path = %path, "question classified");
        state.set_path(path);
    }
}
