use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EssError;

/// Caller role as issued by the upstream authentication collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    HrAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Manager, Role::HrAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::HrAdmin => "hr_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = EssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "hr_admin" | "hr-admin" | "hradmin" => Ok(Self::HrAdmin),
            other => Err(EssError::InvalidValue {
                reason: format!("unknown role `{other}`"),
            }),
        }
    }
}

/// Opaque employee code identifying whose data a row describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectCode(String);

impl SubjectCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubjectCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<i64> for SubjectCode {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Who is asking. Immutable for the duration of one request and trusted as
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    /// Account identity (user id or email) from the auth collaborator.
    pub identity: String,
    pub role: Role,
    /// The caller's own employee code.
    pub subject_code: SubjectCode,
}

impl CallerContext {
    pub fn new(identity: impl Into<String>, role: Role, subject_code: impl Into<SubjectCode>) -> Self {
        Self {
            identity: identity.into(),
            role,
            subject_code: subject_code.into(),
        }
    }
}
