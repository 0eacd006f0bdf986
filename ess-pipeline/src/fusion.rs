//! Fusion stage: the single place where partial failures become
//! user-visible language. Recorded errors and access denials map to fixed
//! messages; only genuine results reach the generator.

use std::sync::Arc;

use ess_core::constants::{
    DATA_NOT_AUTHORIZED_NOTE, DATA_UNAVAILABLE, DATA_UNAVAILABLE_NOTE, DOCUMENTS_UNAVAILABLE,
    MALFORMED_OUTPUT, MODEL_UNAVAILABLE, NOTHING_FOUND, NOT_AUTHORIZED, NO_DATA_FOUND,
    NO_POLICY_FOUND, POLICY_UNAVAILABLE_NOTE,
};
use ess_core::errors::GenerationError;
use ess_core::models::{DocumentResult, RequestState, ResolutionPath, StructuredResult};
use ess_core::traits::ITextGenerator;
use ess_core::{StageError, StageErrorKind};
use ess_observability::RequestOutcome;
use tracing::warn;

use crate::classifier::FALLBACK_PATH;
use crate::prompts;

/// Fixed apology for a recorded error kind.
pub fn apology(kind: StageErrorKind) -> &'static str {
    match kind {
        StageErrorKind::GenerationUnavailable => MODEL_UNAVAILABLE,
        StageErrorKind::StructuredDataUnavailable => DATA_UNAVAILABLE,
        StageErrorKind::DocumentIndexUnavailable => DOCUMENTS_UNAVAILABLE,
        StageErrorKind::AccessDenied => NOT_AUTHORIZED,
        StageErrorKind::MalformedGeneratorOutput => MALFORMED_OUTPUT,
    }
}

pub struct FusionStage {
    generator: Arc<dyn ITextGenerator>,
    history_window: usize,
}

impl FusionStage {
    pub fn new(generator: Arc<dyn ITextGenerator>, history_window: usize) -> Self {
        Self {
            generator,
            history_window,
        }
    }

    /// Compose and store the final answer. A failed composition call is
    /// recorded as a diagnostic and answered with the model apology.
    pub fn run(&self, state: &mut RequestState) -> RequestOutcome {
        let (answer, outcome) = match self.compose(state) {
            Ok(composed) => composed,
            Err(err) => {
                warn!(error = %err, "answer composition failed");
                state.record_diagnostic(StageError::from(err));
                (MODEL_UNAVAILABLE.to_string(), RequestOutcome::Degraded)
            }
        };
        state.set_final_answer(answer);
        outcome
    }

    fn compose(&self, state: &RequestState) -> Result<(String, RequestOutcome), GenerationError> {
        if let Some(err) = state.error() {
            return Ok((apology(err.kind).to_string(), RequestOutcome::Degraded));
        }

        let denied = state.access().is_some_and(|a| a.is_denied());
        let rows = state.structured().filter(|r| !r.is_empty());
        let passages = state.documents().filter(|d| !d.is_empty());
        let history = state.transcript().render(self.history_window);
        let question = state.question();

        match state.path().unwrap_or(FALLBACK_PATH) {
            ResolutionPath::Structured => match rows {
                _ if denied => Ok(fixed(NOT_AUTHORIZED, RequestOutcome::Denied)),
                None => Ok(fixed(NO_DATA_FOUND, RequestOutcome::NoData)),
                Some(result) => {
                    let prompt =
                        prompts::structured_answer(question, &history, &result.query, &result.render());
                    Ok((self.generate(&prompt)?, RequestOutcome::Answered))
                }
            },
            ResolutionPath::Document => match passages {
                None => Ok(fixed(NO_POLICY_FOUND, RequestOutcome::NoData)),
                Some(docs) => {
                    let prompt = prompts::document_answer(question, &history, &docs.render());
                    Ok((self.generate(&prompt)?, RequestOutcome::Answered))
                }
            },
            ResolutionPath::Hybrid => self.compose_hybrid(state, &history, rows, passages, denied),
        }
    }

    fn compose_hybrid(
        &self,
        state: &RequestState,
        history: &str,
        rows: Option<&StructuredResult>,
        passages: Option<&DocumentResult>,
        denied: bool,
    ) -> Result<(String, RequestOutcome), GenerationError> {
        let question = state.question();
        match (rows, passages) {
            (None, None) if denied => Ok(fixed(NOT_AUTHORIZED, RequestOutcome::Denied)),
            (None, None) => Ok(fixed(NOTHING_FOUND, RequestOutcome::NoData)),
            (Some(result), None) => {
                let summary = self.summarise(question, history, result)?;
                Ok((
                    format!("{summary}\n\n{POLICY_UNAVAILABLE_NOTE}"),
                    RequestOutcome::Answered,
                ))
            }
            (None, Some(docs)) => {
                let answer = self.generate(&prompts::document_answer(question, history, &docs.render()))?;
                let note = if denied {
                    DATA_NOT_AUTHORIZED_NOTE
                } else {
                    DATA_UNAVAILABLE_NOTE
                };
                Ok((format!("{answer}\n\n{note}"), RequestOutcome::Answered))
            }
            (Some(result), Some(docs)) => {
                let summary = self.summarise(question, history, result)?;
                let prompt = prompts::hybrid_answer(question, history, &summary, &docs.render());
                Ok((self.generate(&prompt)?, RequestOutcome::Answered))
            }
        }
    }

    fn summarise(
        &self,
        question: &str,
        history: &str,
        result: &StructuredResult,
    ) -> Result<String, GenerationError> {
        self.generate(&prompts::structured_summary(
            question,
            history,
            &result.query,
            &result.render(),
        ))
    }

    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let text = self.generator.generate(prompt)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: self.generator.name().to_string(),
            });
        }
        Ok(text.to_string())
    }
}

fn fixed(message: &str, outcome: RequestOutcome) -> (String, RequestOutcome) {
    (message.to_string(), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_apology() {
        let kinds = [
            StageErrorKind::GenerationUnavailable,
            StageErrorKind::StructuredDataUnavailable,
            StageErrorKind::DocumentIndexUnavailable,
            StageErrorKind::AccessDenied,
            StageErrorKind::MalformedGeneratorOutput,
        ];
        let mut seen: Vec<&str> = kinds.iter().map(|k| apology(*k)).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), kinds.len());
    }
}
