//! Turning the generator's target reference into an evaluator target.

use ess_core::errors::StructuredDataError;
use ess_core::models::{SubjectCode, Target, TargetRef};
use ess_core::traits::IStructuredData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Found(Target),
    /// No employee matches the reference.
    NotFound(String),
}

/// Resolve `reference` for `requester`. The direct-report relation comes
/// from the backend's supervisor column, never from the generator.
pub fn resolve_target(
    data: &dyn IStructuredData,
    requester: &SubjectCode,
    reference: &TargetRef,
) -> Result<ResolvedTarget, StructuredDataError> {
    let target = match reference {
        TargetRef::Myself => Target::subject(requester.clone(), false),
        TargetRef::MyReports => Target::DirectReports,
        TargetRef::Organization => Target::Organization,
        TargetRef::Named(name) if name.trim() == requester.as_str() => {
            Target::subject(requester.clone(), false)
        }
        TargetRef::Named(name) => match data.resolve_subject(name)? {
            Some(record) if &record.code == requester => Target::subject(requester.clone(), false),
            Some(record) => {
                let direct_report = record.supervisor.as_ref() == Some(requester);
                Target::subject(record.code, direct_report)
            }
            None => return Ok(ResolvedTarget::NotFound(name.clone())),
        },
    };
    Ok(ResolvedTarget::Found(target))
}
