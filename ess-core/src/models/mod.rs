pub mod access;
pub mod caller;
pub mod documents;
pub mod request_state;
pub mod resolution;
pub mod structured;
pub mod transcript;

pub use access::{AccessDecision, AccessReason, DataCategory, FieldSet, Target};
pub use caller::{CallerContext, Role, SubjectCode};
pub use documents::{DocumentHit, DocumentResult};
pub use request_state::RequestState;
pub use resolution::ResolutionPath;
pub use structured::{
    AccessOutcome, DataNeed, QuerySpec, Row, RowScope, StructuredResult, SubjectRecord, TargetRef,
};
pub use transcript::{Speaker, Transcript, Turn};
