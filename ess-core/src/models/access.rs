use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::caller::SubjectCode;

/// Sensitivity class of a structured-data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataCategory {
    SelfData,
    DirectReportBasic,
    DirectReportRestricted,
    OrgWide,
}

impl DataCategory {
    pub const ALL: [DataCategory; 4] = [
        DataCategory::SelfData,
        DataCategory::DirectReportBasic,
        DataCategory::DirectReportRestricted,
        DataCategory::OrgWide,
    ];

    fn rank(&self) -> u8 {
        match self {
            Self::SelfData => 0,
            Self::DirectReportBasic => 1,
            Self::DirectReportRestricted => 2,
            Self::OrgWide => 3,
        }
    }

    /// The more restrictive of two categories.
    pub fn stricter(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfData => "SELF_DATA",
            Self::DirectReportBasic => "DIRECT_REPORT_BASIC",
            Self::DirectReportRestricted => "DIRECT_REPORT_RESTRICTED",
            Self::OrgWide => "ORG_WIDE",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "SELF_DATA" | "SELF" => Some(Self::SelfData),
            "DIRECT_REPORT_BASIC" => Some(Self::DirectReportBasic),
            "DIRECT_REPORT_RESTRICTED" => Some(Self::DirectReportRestricted),
            "ORG_WIDE" => Some(Self::OrgWide),
            _ => None,
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whose data a request reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Target {
    /// One employee. `direct_report` is resolved by the structured-data
    /// collaborator, never guessed.
    Subject {
        code: SubjectCode,
        direct_report: bool,
    },
    /// Every direct report of the requester.
    DirectReports,
    /// Aggregates or listings across the organization.
    Organization,
}

impl Target {
    pub fn subject(code: impl Into<SubjectCode>, direct_report: bool) -> Self {
        Self::Subject {
            code: code.into(),
            direct_report,
        }
    }

    pub fn is_subject(&self, code: &SubjectCode) -> bool {
        matches!(self, Self::Subject { code: c, .. } if c == code)
    }
}

/// Columns a decision permits. Names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "fields")]
pub enum FieldSet {
    All,
    Only(BTreeSet<String>),
    Nothing,
}

impl FieldSet {
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            fields
                .into_iter()
                .map(|f| f.as_ref().trim().to_ascii_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        )
    }

    pub fn permits(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(fields) => fields.contains(&field.to_ascii_lowercase()),
            Self::Nothing => false,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Keep only the permitted entries of `fields`, preserving order.
    pub fn restrict(&self, fields: &[String]) -> Vec<String> {
        fields
            .iter()
            .filter(|f| self.permits(f))
            .cloned()
            .collect()
    }
}

/// Machine-readable reason attached to every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    SelfAccess,
    DirectReportBasic,
    HrAdmin,
    NotSelf,
    RestrictedCategory,
    NotDirectReport,
    OrgScope,
}

impl AccessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfAccess => "self_access",
            Self::DirectReportBasic => "direct_report_basic",
            Self::HrAdmin => "hr_admin",
            Self::NotSelf => "not_self",
            Self::RestrictedCategory => "restricted_category",
            Self::NotDirectReport => "not_direct_report",
            Self::OrgScope => "org_scope",
        }
    }
}

impl fmt::Display for AccessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative allow/deny plus field restriction for one data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub permitted: FieldSet,
    pub reason: AccessReason,
}

impl AccessDecision {
    pub fn allow(permitted: FieldSet, reason: AccessReason) -> Self {
        Self {
            allowed: true,
            permitted,
            reason,
        }
    }

    pub fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            permitted: FieldSet::Nothing,
            reason,
        }
    }
}
