use crate::errors::GenerationError;

/// Text-generation provider. Given a prompt, returns completion text.
pub trait ITextGenerator: Send + Sync {
    /// Generate a completion for a single prompt.
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently configured to serve requests.
    fn is_available(&self) -> bool {
        true
    }
}
