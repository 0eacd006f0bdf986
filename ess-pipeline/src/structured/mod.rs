//! Structured-query stage: data need, target resolution, access decision,
//! guarded query generation and execution.
//!
//! The generator only ever proposes. Whether a query runs, which rows it
//! can read, and which columns survive is decided by [`AccessPolicy`],
//! [`QueryGuard`], scoped execution with [`retain_in_scope`], and
//! [`project_rows`].

pub mod query_spec;
pub mod target;

use std::sync::Arc;

use ess_access::{project_rows, retain_in_scope, AccessPolicy, FieldCatalog, QueryGuard};
use ess_core::config::StructuredConfig;
use ess_core::models::{
    AccessOutcome, RequestState, Role, Row, RowScope, StructuredResult, SubjectCode,
};
use ess_core::traits::{IStructuredData, ITextGenerator};
use ess_core::{StageError, StageErrorKind};
use ess_observability::tracing_setup::events;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::extract;
use crate::prompts;
use self::target::ResolvedTarget;

pub struct StructuredQueryStage {
    generator: Arc<dyn ITextGenerator>,
    data: Arc<dyn IStructuredData>,
    policy: AccessPolicy,
    guard: QueryGuard,
    config: StructuredConfig,
    history_window: usize,
}

impl StructuredQueryStage {
    pub fn new(
        generator: Arc<dyn ITextGenerator>,
        data: Arc<dyn IStructuredData>,
        catalog: FieldCatalog,
        config: StructuredConfig,
        history_window: usize,
    ) -> Self {
        Self {
            generator,
            data,
            policy: AccessPolicy::from_catalog(&catalog),
            guard: QueryGuard::new(catalog),
            config,
            history_window,
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        self.guard.catalog()
    }

    /// No-op unless the path needs structured data and no error is recorded.
    pub fn run(&self, state: &mut RequestState) {
        if state.has_error() || !state.path().is_some_and(|p| p.needs_structured()) {
            return;
        }
        if let Err(err) = self.resolve(state) {
            debug!(kind = %err.kind, "structured stage recorded an error");
            state.record_error(err);
        }
    }

    fn resolve(&self, state: &mut RequestState) -> Result<(), StageError> {
        let request_id = state.request_id();
        let caller = state.caller().clone();
        let history = state.transcript().render(self.history_window);
        let schema = self.data.describe_schema()?;

        // Step 1: data need (advisory).
        let raw = self
            .generator
            .generate(&prompts::data_need(state.question(), &history, &caller, &schema))?;
        let need = extract::parse_data_need(&raw)?;
        state.set_data_need(need.clone());

        // Step 2: whose data, resolved by the backend.
        let target =
            match target::resolve_target(self.data.as_ref(), &caller.subject_code, &need.target)? {
                ResolvedTarget::Found(target) => target,
                ResolvedTarget::NotFound(reference) => {
                    debug!(%request_id, "named subject not found");
                    state.set_access(AccessOutcome::SubjectNotFound { reference });
                    return Ok(());
                }
            };

        // Step 3: decide. The generator's category can only tighten.
        let implied = self
            .catalog()
            .implied_category(&caller.subject_code, &target, &need.columns);
        let category = need.category.map_or(implied, |proposed| proposed.stricter(implied));
        let decision = self
            .policy
            .evaluate(caller.role, &caller.subject_code, &target, category);
        if !decision.allowed {
            events::access_denied(request_id, caller.role.as_str(), decision.reason.as_str());
            state.set_access(AccessOutcome::Denied {
                reason: decision.reason,
            });
            state.record_diagnostic(StageError::new(
                StageErrorKind::AccessDenied,
                format!("{} denied for {}: {}", caller.role, category, decision.reason),
            ));
            return Ok(());
        }
        state.set_access(AccessOutcome::Authorized {
            decision: decision.clone(),
        });

        // Step 4: scoped query generation.
        let spec = query_spec::build_query_spec(
            &need,
            &target,
            &caller,
            category,
            decision,
            self.config.max_rows,
        );
        state.set_query_spec(spec.clone());
        let row_filter = query_spec::describe_row_scope(&spec.scope, &self.config);
        let raw = self.generator.generate(&prompts::query(
            state.question(),
            &history,
            &spec,
            &schema,
            self.data.dialect(),
            &row_filter,
        ))?;
        let generated = extract::extract_query(&raw)?;
        state.set_generated_query(generated.clone());

        // Step 5: guard, execute, project.
        let enforced_scope = match caller.role {
            Role::HrAdmin => RowScope::Unrestricted,
            Role::Employee | Role::Manager => spec.scope.clone(),
        };
        let query = self
            .guard
            .check(&generated, &spec.decision.permitted, &enforced_scope)
            .map_err(|violation| {
                events::query_rejected(request_id, &violation.to_string());
                StageError::malformed(format!("generated query rejected: {violation}"))
            })?;

        let mut rows = self.execute_in_scope(&query, &enforced_scope, request_id)?;
        let stripped = project_rows(&mut rows, &spec.decision.permitted, self.catalog());
        let truncated = rows.len() > spec.row_limit;
        rows.truncate(spec.row_limit);
        info!(
            %request_id,
            rows = rows.len(),
            stripped,
            truncated,
            "structured query executed"
        );
        state.set_structured(StructuredResult {
            query,
            rows,
            truncated,
        });
        Ok(())
    }

    /// Subjects whose rows `scope` admits; `None` when unrestricted. Report
    /// lists come from the backend's supervisor column.
    fn scope_subjects(&self, scope: &RowScope) -> Result<Option<Vec<SubjectCode>>, StageError> {
        Ok(match scope {
            RowScope::Unrestricted => None,
            RowScope::Subject(code) => Some(vec![code.clone()]),
            RowScope::ReportsOf(supervisor) => Some(
                self.data
                    .direct_reports(supervisor)?
                    .into_iter()
                    .map(|record| record.code)
                    .collect(),
            ),
        })
    }

    fn execute_in_scope(
        &self,
        query: &str,
        scope: &RowScope,
        request_id: Uuid,
    ) -> Result<Vec<Row>, StageError> {
        let Some(subjects) = self.scope_subjects(scope)? else {
            return Ok(self.data.execute(query)?);
        };
        let mut rows = self.data.execute_scoped(query, &subjects)?;
        let foreign = retain_in_scope(&mut rows, &self.config.code_column, &subjects);
        if foreign > 0 {
            warn!(%request_id, foreign, "dropped rows outside the subject scope");
        }
        Ok(rows)
    }
}
