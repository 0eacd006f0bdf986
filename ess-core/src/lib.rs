//! # ess-core
//!
//! Foundation crate for the employee self-service assistant.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::EssConfig;
pub use errors::{EssError, EssResult, StageError, StageErrorKind};
pub use models::{
    AccessDecision, CallerContext, DataCategory, FieldSet, RequestState, ResolutionPath, Role,
    SubjectCode, Target, Transcript, Turn,
};
pub use traits::{IDocumentIndex, IStructuredData, ITextGenerator};
