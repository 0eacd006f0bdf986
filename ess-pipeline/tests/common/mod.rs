#![allow(dead_code)]

use std::sync::Arc;

use ess_core::config::EssConfig;
use ess_core::traits::{IDocumentIndex, ITextGenerator};
use ess_pipeline::prompts::markers;
use ess_pipeline::Pipeline;
use test_fixtures::{seeded_store, RecordingData, ScriptedGenerator};

pub const SELF_LEAVE_NEED: &str = r#"{"intent":"leave balance","target_kind":"self","target_name":null,"category":"SELF_DATA","tables":["leave_balances"],"columns":["leave_type","remaining"]}"#;

pub const CASUAL_LEAVE_QUERY: &str = r#"{"query": "SELECT leave_type, remaining FROM leave_balances WHERE employee_code = 42 AND leave_type = 'Casual'"}"#;

pub const SICK_LEAVE_QUERY: &str = r#"{"query": "SELECT leave_type, remaining FROM leave_balances WHERE employee_code = 42 AND leave_type = 'Sick'"}"#;

/// Pipeline over the seeded HR store with a recording wrapper.
pub fn pipeline(
    generator: Arc<dyn ITextGenerator>,
    index: Arc<dyn IDocumentIndex>,
) -> (Pipeline, Arc<RecordingData>) {
    pipeline_with_config(EssConfig::default(), generator, index)
}

pub fn pipeline_with_config(
    config: EssConfig,
    generator: Arc<dyn ITextGenerator>,
    index: Arc<dyn IDocumentIndex>,
) -> (Pipeline, Arc<RecordingData>) {
    let data = Arc::new(RecordingData::new(Arc::new(seeded_store())));
    let pipeline = Pipeline::new(config, generator, data.clone(), index);
    (pipeline, data)
}

/// Generator answering a DATABASE question about the caller's casual leave.
pub fn casual_leave_generator() -> ScriptedGenerator {
    ScriptedGenerator::new()
        .on(markers::CLASSIFY, "DATABASE")
        .on(markers::DATA_NEED, SELF_LEAVE_NEED)
        .on(markers::QUERY, CASUAL_LEAVE_QUERY)
        .on_all(
            &[markers::STRUCTURED_ANSWER, r#""remaining":8"#],
            "You have 8 casual leaves remaining.",
        )
}
