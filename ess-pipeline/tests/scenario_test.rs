//! End-to-end request scenarios over the seeded HR dataset.

mod common;

use std::sync::Arc;

use common::*;
use ess_core::constants::{NOT_AUTHORIZED, NO_DATA_FOUND, POLICY_UNAVAILABLE_NOTE};
use ess_core::models::{
    AccessOutcome, AccessReason, DocumentHit, ResolutionPath, Speaker, TargetRef,
};
use ess_core::StageErrorKind;
use ess_observability::RequestOutcome;
use ess_pipeline::prompts::markers;
use ess_pipeline::RequestControl;
use test_fixtures::*;

// ── STRUCTURED: self lookup ──

#[test]
fn employee_casual_leave_balance_is_summarised_from_rows() {
    let generator = Arc::new(casual_leave_generator());
    let (pipeline, data) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));
    let caller = employee_42();

    let handled = pipeline
        .handle_detailed("s-42", "How many casual leaves do I have?", Some(&caller), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.answer, "You have 8 casual leaves remaining.");
    assert_eq!(handled.outcome, RequestOutcome::Answered);
    let state = &handled.state;
    assert_eq!(state.path(), Some(ResolutionPath::Structured));
    match state.access() {
        Some(AccessOutcome::Authorized { decision }) => {
            assert_eq!(decision.reason, AccessReason::SelfAccess)
        }
        other => panic!("expected authorized, got {other:?}"),
    }
    let rows = &state.structured().unwrap().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["remaining"], 8);
    assert_eq!(data.execute_count(), 1);
    // Documents are never consulted on the STRUCTURED path.
    assert_eq!(generator.prompts_containing(markers::REPHRASE), 0);
    assert!(state.documents().is_none());
}

#[test]
fn answer_prompt_contains_only_the_returned_row() {
    let generator = Arc::new(casual_leave_generator());
    let (pipeline, _) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));
    pipeline
        .handle("s-42", "How many casual leaves do I have?", Some(&employee_42()))
        .unwrap();

    let prompt = generator
        .last_prompt_containing(markers::STRUCTURED_ANSWER)
        .unwrap();
    assert!(prompt.contains(r#"{"leave_type":"Casual","remaining":8}"#));
    assert!(!prompt.contains("Sick"));
    assert!(!prompt.contains("Earned"));
}

// ── STRUCTURED: access denial ──

#[test]
fn manager_asking_for_direct_report_salary_is_refused_without_a_query() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            // The generator understates the category; the catalog corrects it.
            .on(
                markers::DATA_NEED,
                r#"{"intent":"salary","target_kind":"named","target_name":"Neha","category":"DIRECT_REPORT_BASIC","tables":["salary_summary"],"columns":["net_salary"]}"#,
            )
            .on(markers::QUERY, r#"{"query":"SELECT net_salary FROM salary_summary WHERE employee_code = 17"}"#),
    );
    let (pipeline, data) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));

    let handled = pipeline
        .handle_detailed("s-10", "What is Neha's salary?", Some(&manager_10()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.answer, NOT_AUTHORIZED);
    assert_eq!(handled.outcome, RequestOutcome::Denied);
    assert_eq!(
        handled.state.access(),
        Some(&AccessOutcome::Denied {
            reason: AccessReason::RestrictedCategory
        })
    );
    assert_eq!(data.execute_count(), 0);
    assert_eq!(generator.prompts_containing(markers::QUERY), 0);
    assert!(handled.state.generated_query().is_none());
    // A denial is an outcome, not a request error.
    assert!(handled.state.error().is_none());
    assert!(handled
        .state
        .diagnostics()
        .iter()
        .any(|d| d.kind == StageErrorKind::AccessDenied));
}

#[test]
fn employee_asking_about_a_colleague_is_refused() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            .on(
                markers::DATA_NEED,
                r#"{"intent":"department","target_kind":"named","target_name":"Neha Reddy","category":"DIRECT_REPORT_BASIC","tables":["employees"],"columns":["department"]}"#,
            ),
    );
    let (pipeline, data) = pipeline(generator, Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s", "Which department is Neha Reddy in?", Some(&employee_42()), &RequestControl::new())
        .unwrap();
    assert_eq!(handled.answer, NOT_AUTHORIZED);
    assert_eq!(
        handled.state.access(),
        Some(&AccessOutcome::Denied {
            reason: AccessReason::NotSelf
        })
    );
    assert_eq!(data.execute_count(), 0);
}

#[test]
fn manager_reads_basic_fields_of_a_direct_report() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            .on(
                markers::DATA_NEED,
                r#"{"intent":"leave balance","target_kind":"named","target_name":"Neha","category":"DIRECT_REPORT_BASIC","tables":["leave_balances"],"columns":["leave_type","remaining"]}"#,
            )
            .on(
                markers::QUERY,
                r#"{"query":"SELECT leave_type, remaining FROM leave_balances WHERE employee_code = 17 ORDER BY leave_type"}"#,
            )
            .on(markers::STRUCTURED_ANSWER, "Neha has 6 casual and 9 sick leaves left."),
    );
    let (pipeline, data) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s-10", "How many leaves does Neha have left?", Some(&manager_10()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.answer, "Neha has 6 casual and 9 sick leaves left.");
    assert_eq!(data.execute_count(), 1);
    let spec = handled.state.query_spec().unwrap();
    assert!(!spec.decision.permitted.is_all());
    assert!(!spec.decision.permitted.permits("net_salary"));
    // The query prompt lists only basic columns.
    let prompt = generator.last_prompt_containing(markers::QUERY).unwrap();
    let allowed = prompt
        .lines()
        .find(|l| l.starts_with("Columns: You may ONLY reference these columns"))
        .unwrap();
    assert!(allowed.contains("remaining"));
    assert!(!allowed.contains("net_salary"));
}

#[test]
fn manager_lists_the_team_with_basic_fields() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            .on(
                markers::DATA_NEED,
                r#"{"intent":"team leave","target_kind":"direct_reports","category":"DIRECT_REPORT_BASIC","tables":["employees","leave_balances"],"columns":["employee_name","leave_type","remaining"]}"#,
            )
            .on(
                markers::QUERY,
                r#"{"query":"SELECT e.employee_name, b.leave_type, b.remaining FROM employees e JOIN leave_balances b ON b.employee_code = e.employee_code WHERE e.supervisor_id = 10"}"#,
            )
            .on(markers::STRUCTURED_ANSWER, "Your team has leave left."),
    );
    let (pipeline, _) = pipeline(generator, Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s-10", "How much leave does my team have?", Some(&manager_10()), &RequestControl::new())
        .unwrap();

    let rows = &handled.state.structured().unwrap().rows;
    assert_eq!(rows.len(), 5);
    let names: std::collections::BTreeSet<_> =
        rows.iter().map(|r| r["employee_name"].as_str().unwrap()).collect();
    assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["Arjun Mehta", "Neha Reddy"]);
}

#[test]
fn hr_admin_reads_restricted_fields_of_anyone() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            .on(
                markers::DATA_NEED,
                r#"{"intent":"salary","target_kind":"named","target_name":"Karan","category":"DIRECT_REPORT_RESTRICTED","tables":["salary_summary"],"columns":["net_salary"]}"#,
            )
            .on(
                markers::QUERY,
                r#"{"query":"SELECT s.net_salary FROM salary_summary s JOIN employees e ON e.employee_code = s.employee_code WHERE e.employee_name = 'Karan Shah'"}"#,
            )
            .on_all(&[markers::STRUCTURED_ANSWER, "73000"], "Karan's net salary is 73,000."),
    );
    let (pipeline, _) = pipeline(generator, Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s-1", "What is Karan's net salary?", Some(&hr_admin_1()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.answer, "Karan's net salary is 73,000.");
    match handled.state.access() {
        Some(AccessOutcome::Authorized { decision }) => assert!(decision.permitted.is_all()),
        other => panic!("expected authorized, got {other:?}"),
    }
}

#[test]
fn unknown_person_yields_no_data() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            .on(
                markers::DATA_NEED,
                r#"{"intent":"department","target_kind":"named","target_name":"Zed","tables":["employees"],"columns":["department"]}"#,
            ),
    );
    let (pipeline, data) = pipeline(generator, Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s-10", "Which department is Zed in?", Some(&manager_10()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.answer, NO_DATA_FOUND);
    assert_eq!(handled.outcome, RequestOutcome::NoData);
    assert_eq!(
        handled.state.data_need().unwrap().target,
        TargetRef::Named("Zed".into())
    );
    assert!(matches!(
        handled.state.access(),
        Some(AccessOutcome::SubjectNotFound { .. })
    ));
    assert_eq!(data.execute_count(), 0);
    assert!(handled.state.error().is_none());
}

#[test]
fn empty_result_set_yields_no_data() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "DATABASE")
            .on(markers::DATA_NEED, SELF_LEAVE_NEED)
            .on(
                markers::QUERY,
                r#"{"query":"SELECT remaining FROM leave_balances WHERE employee_code = 42 AND leave_type = 'Sabbatical'"}"#,
            ),
    );
    let (pipeline, data) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));
    let answer = pipeline
        .handle("s", "How many sabbatical days do I have?", Some(&employee_42()))
        .unwrap();
    assert_eq!(answer, NO_DATA_FOUND);
    assert_eq!(data.execute_count(), 1);
    assert_eq!(generator.prompts_containing(markers::STRUCTURED_ANSWER), 0);
}

// ── DOCUMENT ──

#[test]
fn policy_question_is_answered_from_passages() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "POLICY")
            .on(markers::REPHRASE, "maternity leave eligibility")
            .on_all(
                &[markers::DOCUMENT_ANSWER, "twenty six weeks"],
                "Eligible employees get 26 weeks of paid maternity leave.",
            ),
    );
    let (pipeline, data) = pipeline(generator, Arc::new(policy_index()));
    let handled = pipeline
        .handle_detailed("s", "What is the maternity leave policy?", Some(&employee_42()), &RequestControl::new())
        .unwrap();

    assert_eq!(
        handled.answer,
        "Eligible employees get 26 weeks of paid maternity leave."
    );
    let docs = handled.state.documents().unwrap();
    assert_eq!(docs.phrase, "maternity leave eligibility");
    assert_eq!(docs.hits[0].source.as_deref(), Some("maternity-policy"));
    // Structured data is never touched on the DOCUMENT path.
    assert_eq!(data.execute_count(), 0);
    assert_eq!(data.resolve_count(), 0);
}

#[test]
fn failed_rephrase_searches_with_the_raw_question() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "POLICY")
            .fail_on(markers::REPHRASE)
            .on(markers::DOCUMENT_ANSWER, "Forty hours a week."),
    );
    let index = Arc::new(StaticIndex::new(vec![DocumentHit::new("Working hours: forty hours.", 0.9)]));
    let (pipeline, _) = pipeline(generator, index.clone());
    let handled = pipeline
        .handle_detailed("s", "What are the working hours?", Some(&employee_42()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.answer, "Forty hours a week.");
    assert_eq!(index.searches(), vec![("What are the working hours?".to_string(), 5)]);
    assert!(handled.state.error().is_none());
    assert!(handled
        .state
        .diagnostics()
        .iter()
        .any(|d| d.kind == StageErrorKind::GenerationUnavailable));
}

// ── HYBRID ──

#[test]
fn hybrid_without_documents_states_policy_was_unavailable() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "HYBRID")
            .on(markers::DATA_NEED, SELF_LEAVE_NEED)
            .on(markers::QUERY, SICK_LEAVE_QUERY)
            .on(markers::REPHRASE, "sick leave rules")
            .on_all(&[markers::SUMMARY, r#""remaining":8"#], "You have 8 sick leaves remaining."),
    );
    let (pipeline, _) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s", "Can I take sick leave tomorrow?", Some(&employee_42()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.state.path(), Some(ResolutionPath::Hybrid));
    assert!(handled.answer.starts_with("You have 8 sick leaves remaining."));
    assert!(handled.answer.contains(POLICY_UNAVAILABLE_NOTE));
    assert_eq!(generator.prompts_containing(markers::HYBRID_ANSWER), 0);
}

#[test]
fn hybrid_with_both_sides_composes_from_summary_and_passages() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "HYBRID")
            .on(markers::DATA_NEED, SELF_LEAVE_NEED)
            .on(markers::QUERY, SICK_LEAVE_QUERY)
            .on(markers::REPHRASE, "sick leave application rules")
            .on(markers::SUMMARY, "You have 8 sick leaves remaining.")
            .on_all(
                &[markers::HYBRID_ANSWER, "You have 8 sick leaves remaining.", "medical certificate"],
                "Yes. You have 8 sick days; inform your manager before the day starts.",
            ),
    );
    let (pipeline, _) = pipeline(generator, Arc::new(policy_index()));
    let answer = pipeline
        .handle("s", "Can I take sick leave tomorrow?", Some(&employee_42()))
        .unwrap();
    assert_eq!(
        answer,
        "Yes. You have 8 sick days; inform your manager before the day starts."
    );
}

#[test]
fn hybrid_with_denied_data_answers_from_policy_and_says_so() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "HYBRID")
            .on(
                markers::DATA_NEED,
                r#"{"intent":"bonus eligibility","target_kind":"named","target_name":"Neha Reddy","category":"DIRECT_REPORT_RESTRICTED","tables":["salary_summary"],"columns":["bonus"]}"#,
            )
            .on(markers::REPHRASE, "annual bonus eligibility")
            .on(markers::DOCUMENT_ANSWER, "Bonus needs permanent status and one year of tenure."),
    );
    let (pipeline, data) = pipeline(generator, Arc::new(policy_index()));
    let handled = pipeline
        .handle_detailed("s", "Why didn't Neha Reddy get a bonus?", Some(&manager_10()), &RequestControl::new())
        .unwrap();

    assert!(handled.answer.starts_with("Bonus needs permanent status"));
    assert!(handled
        .answer
        .ends_with(ess_core::constants::DATA_NOT_AUTHORIZED_NOTE));
    assert_eq!(data.execute_count(), 0);
}

// ── Classifier fallback ──

#[test]
fn unrecognised_label_falls_back_to_structured() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "Probably something about leave")
            .on(markers::DATA_NEED, SELF_LEAVE_NEED)
            .on(markers::QUERY, CASUAL_LEAVE_QUERY)
            .on(markers::STRUCTURED_ANSWER, "You have 8 casual leaves remaining."),
    );
    let (pipeline, _) = pipeline(generator, Arc::new(StaticIndex::empty()));
    let handled = pipeline
        .handle_detailed("s", "casual leave?", Some(&employee_42()), &RequestControl::new())
        .unwrap();

    assert_eq!(handled.state.path(), Some(ResolutionPath::Structured));
    assert!(handled.state.error().is_none());
    assert_eq!(handled.state.diagnostics()[0].kind, StageErrorKind::MalformedGeneratorOutput);
    assert_eq!(handled.answer, "You have 8 casual leaves remaining.");
}

#[test]
fn decorated_label_is_accepted() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .on(markers::CLASSIFY, "\"POLICY\".")
            .on(markers::REPHRASE, "working hours")
            .on(markers::DOCUMENT_ANSWER, "Forty hours."),
    );
    let (pipeline, _) = pipeline(generator, Arc::new(policy_index()));
    let handled = pipeline
        .handle_detailed("s", "What are the working hours?", Some(&employee_42()), &RequestControl::new())
        .unwrap();
    assert_eq!(handled.state.path(), Some(ResolutionPath::Document));
    assert!(handled.state.diagnostics().is_empty());
}

// ── Transcript ──

#[test]
fn transcript_records_each_exchange_in_order() {
    let generator = Arc::new(casual_leave_generator());
    let (pipeline, _) = pipeline(generator.clone(), Arc::new(StaticIndex::empty()));
    let caller = employee_42();

    let a1 = pipeline.handle("chat", "How many casual leaves do I have?", Some(&caller)).unwrap();
    let a2 = pipeline.handle("chat", "And how many do I have now?", Some(&caller)).unwrap();

    let transcript = pipeline.sessions().get("chat");
    let turns: Vec<(Speaker, &str)> = transcript
        .turns()
        .iter()
        .map(|t| (t.speaker, t.text.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (Speaker::User, "How many casual leaves do I have?"),
            (Speaker::Assistant, a1.as_str()),
            (Speaker::User, "And how many do I have now?"),
            (Speaker::Assistant, a2.as_str()),
        ]
    );

    // The second request sees the first exchange.
    let classify_prompts: Vec<String> = generator
        .prompts()
        .into_iter()
        .filter(|p| p.starts_with(markers::CLASSIFY))
        .collect();
    assert_eq!(classify_prompts.len(), 2);
    assert!(classify_prompts[0].contains("(none)"));
    assert!(classify_prompts[1].contains("User: How many casual leaves do I have?"));
}

#[test]
fn sessions_are_isolated() {
    let generator = Arc::new(casual_leave_generator());
    let (pipeline, _) = pipeline(generator, Arc::new(StaticIndex::empty()));
    pipeline.handle("a", "How many casual leaves do I have?", Some(&employee_42())).unwrap();
    assert_eq!(pipeline.sessions().get("a").len(), 2);
    assert!(pipeline.sessions().get("b").is_empty());
}
