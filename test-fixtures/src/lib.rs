//! Test fixture loader and scripted collaborators for the assistant's
//! integration tests.
//!
//! Provides the seeded HR dataset, the policy corpus, well-known callers,
//! and fakes for every collaborator trait.

pub mod fakes;

use std::path::PathBuf;

use serde::de::DeserializeOwned;

use ess_core::config::{DocumentConfig, StructuredConfig};
use ess_core::models::{CallerContext, Role};
use ess_providers::{KeywordIndex, PolicyDocument, SqliteHrStore};

pub use fakes::{
    FailingData, FnGenerator, RecordingData, Reply, ScriptedGenerator, StaticIndex,
    UnavailableIndex,
};

/// Root directory of the fixture data files.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Read a fixture file as text.
///
/// # Panics
/// Panics if the file doesn't exist.
pub fn read_fixture(relative_path: &str) -> String {
    let path = fixtures_root().join(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let content = read_fixture(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", relative_path, e))
}

/// The seeded HR dataset in an in-memory SQLite store.
pub fn seeded_store() -> SqliteHrStore {
    SqliteHrStore::from_sql(&read_fixture("hr_seed.sql"), StructuredConfig::default())
        .unwrap_or_else(|e| panic!("Failed to seed HR store: {e}"))
}

pub fn policy_corpus() -> Vec<PolicyDocument> {
    load_fixture("policies.json")
}

/// Keyword index over the policy corpus.
pub fn policy_index() -> KeywordIndex {
    KeywordIndex::from_json(&read_fixture("policies.json"), &DocumentConfig::default())
        .unwrap_or_else(|e| panic!("Failed to build policy index: {e}"))
}

// ── Well-known callers from the seed ──

/// Arjun Mehta, employee 42, reports to 10.
pub fn employee_42() -> CallerContext {
    CallerContext::new("arjun.mehta@example.test", Role::Employee, "42")
}

/// Ravi Kumar, manager 10. Neha (17) and Arjun (42) report to him.
pub fn manager_10() -> CallerContext {
    CallerContext::new("ravi.kumar@example.test", Role::Manager, "10")
}

/// Anita Desai, HR admin 1.
pub fn hr_admin_1() -> CallerContext {
    CallerContext::new("anita.desai@example.test", Role::HrAdmin, "1")
}
