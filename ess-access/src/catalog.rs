use std::collections::BTreeSet;

use ess_core::config::AccessConfig;
use ess_core::models::{DataCategory, FieldSet, SubjectCode, Target};

/// Column sensitivity classification. Names are lowercase.
///
/// A column is *basic* when a manager may read it for a direct report, and
/// *restricted* otherwise. Columns in neither set are uncatalogued and carry
/// no restriction of their own (aliases, aggregates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    basic: BTreeSet<String>,
    restricted: BTreeSet<String>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl FieldCatalog {
    pub fn new<B, R>(basic: B, restricted: R) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let basic: BTreeSet<String> = basic.into_iter().map(|f| normalize(f.as_ref())).collect();
        // A column listed in both is treated as restricted.
        let restricted: BTreeSet<String> =
            restricted.into_iter().map(|f| normalize(f.as_ref())).collect();
        let basic = basic.difference(&restricted).cloned().collect();
        Self { basic, restricted }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(&config.basic_fields, &config.restricted_fields)
    }

    /// Classify every backend column that is not basic as restricted.
    pub fn with_known_columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for column in columns {
            let column = normalize(column.as_ref());
            if !column.is_empty() && !self.basic.contains(&column) {
                self.restricted.insert(column);
            }
        }
        self
    }

    pub fn is_catalogued(&self, column: &str) -> bool {
        let column = normalize(column);
        self.basic.contains(&column) || self.restricted.contains(&column)
    }

    pub fn is_basic(&self, column: &str) -> bool {
        self.basic.contains(&normalize(column))
    }

    pub fn is_restricted(&self, column: &str) -> bool {
        self.restricted.contains(&normalize(column))
    }

    /// The field set a manager gets for a direct report.
    pub fn basic_field_set(&self) -> FieldSet {
        FieldSet::Only(self.basic.clone())
    }

    /// The category implied by whose data is requested and which columns.
    pub fn implied_category(
        &self,
        requester: &SubjectCode,
        target: &Target,
        columns: &[String],
    ) -> DataCategory {
        match target {
            Target::Subject { code, .. } if code == requester => DataCategory::SelfData,
            Target::Subject { .. } | Target::DirectReports => {
                if columns.iter().any(|c| self.is_restricted(c)) {
                    DataCategory::DirectReportRestricted
                } else {
                    DataCategory::DirectReportBasic
                }
            }
            Target::Organization => DataCategory::OrgWide,
        }
    }
}
