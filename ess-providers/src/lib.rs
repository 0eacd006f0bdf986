//! # ess-providers
//!
//! Reference implementations of the collaborator traits in `ess-core`.
//! The pipeline only ever sees the traits; these exist so it can run end to
//! end without external services.

pub mod chat_client;
pub mod keyword_index;
pub mod sqlite_store;

pub use chat_client::ChatClient;
pub use keyword_index::{chunk_text, KeywordIndex, PolicyDocument};
pub use sqlite_store::SqliteHrStore;
