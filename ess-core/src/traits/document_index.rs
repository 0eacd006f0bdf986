use crate::errors::DocumentIndexError;
use crate::models::DocumentHit;

/// Searchable policy-document library.
pub trait IDocumentIndex: Send + Sync {
    /// Return up to `k` passages most similar to `phrase`, best first.
    fn search(&self, phrase: &str, k: usize) -> Result<Vec<DocumentHit>, DocumentIndexError>;

    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }
}
