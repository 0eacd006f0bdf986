//! # ess-pipeline
//!
//! Fixed-order question pipeline. Every request walks the same four stages
//! against one [`RequestState`](ess_core::RequestState):
//!
//! ```text
//! Pipeline::handle
//! ├── Classifier            (DATABASE / POLICY / HYBRID → ResolutionPath)
//! ├── StructuredQueryStage  (data need → target → AccessPolicy → QueryGuard → rows)
//! ├── DocumentLookupStage   (rephrase → top-k policy passages)
//! └── FusionStage           (the only place failures become user-visible text)
//! ```
//!
//! Both lookup stages always run and no-op when the path doesn't need them.
//! The session lock is held from transcript snapshot to the final append.

pub mod classifier;
pub mod control;
pub mod documents;
pub mod extract;
pub mod fusion;
pub mod orchestrator;
pub mod prompts;
pub mod structured;

pub use classifier::Classifier;
pub use control::{RequestControl, Stage};
pub use documents::DocumentLookupStage;
pub use fusion::FusionStage;
pub use orchestrator::{HandledRequest, Pipeline};
pub use structured::StructuredQueryStage;
