use ess_core::models::{AccessDecision, AccessReason, DataCategory, FieldSet, Role, SubjectCode, Target};

use crate::catalog::FieldCatalog;

/// The access evaluator. Holds only the basic field set; every decision is a
/// pure function of its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    basic: FieldSet,
}

impl AccessPolicy {
    pub fn new(basic: FieldSet) -> Self {
        Self { basic }
    }

    pub fn from_catalog(catalog: &FieldCatalog) -> Self {
        Self::new(catalog.basic_field_set())
    }

    pub fn evaluate(
        &self,
        role: Role,
        requester: &SubjectCode,
        target: &Target,
        category: DataCategory,
    ) -> AccessDecision {
        match role {
            Role::HrAdmin => AccessDecision::allow(FieldSet::All, AccessReason::HrAdmin),
            Role::Employee => match target {
                Target::Subject { code, .. } if code == requester => {
                    AccessDecision::allow(FieldSet::All, AccessReason::SelfAccess)
                }
                Target::Subject { .. } | Target::DirectReports => {
                    AccessDecision::deny(AccessReason::NotSelf)
                }
                Target::Organization => AccessDecision::deny(AccessReason::OrgScope),
            },
            Role::Manager => self.evaluate_manager(requester, target, category),
        }
    }

    fn evaluate_manager(
        &self,
        requester: &SubjectCode,
        target: &Target,
        category: DataCategory,
    ) -> AccessDecision {
        match target {
            Target::Subject { code, .. } if code == requester => {
                AccessDecision::allow(FieldSet::All, AccessReason::SelfAccess)
            }
            Target::Subject {
                direct_report: false,
                ..
            } => AccessDecision::deny(AccessReason::NotDirectReport),
            Target::Subject {
                direct_report: true,
                ..
            }
            | Target::DirectReports => match category {
                DataCategory::DirectReportBasic => {
                    AccessDecision::allow(self.basic.clone(), AccessReason::DirectReportBasic)
                }
                DataCategory::SelfData
                | DataCategory::DirectReportRestricted
                | DataCategory::OrgWide => AccessDecision::deny(AccessReason::RestrictedCategory),
            },
            Target::Organization => AccessDecision::deny(AccessReason::OrgScope),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::from_catalog(&FieldCatalog::from_config(&Default::default()))
    }
}
