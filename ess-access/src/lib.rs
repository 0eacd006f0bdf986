//! # ess-access
//!
//! Everything that decides what a caller may see.
//!
//! - [`AccessPolicy`]: the deterministic evaluator. Sole authority for
//!   allow/deny; prompt text is advisory only.
//! - [`FieldCatalog`]: column sensitivity classification.
//! - [`QueryGuard`]: validates generated query text before execution.
//! - [`project_rows`]: strips non-permitted catalogued columns from results.
//! - [`retain_in_scope`]: drops result rows that belong to other subjects.

mod catalog;
mod guard;
mod policy;
mod projection;

pub use catalog::FieldCatalog;
pub use guard::{GuardViolation, QueryGuard};
pub use policy::AccessPolicy;
pub use projection::{project_rows, retain_in_scope};
