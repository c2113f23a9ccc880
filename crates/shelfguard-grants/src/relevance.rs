//! narrowing the license type catalog to the types that govern one resource.

use regex::Regex;
use shelfguard_types::{ConditionSet, LicenseType};
use tracing::debug;

use crate::error::{Error, Result};
use crate::index::{IndexQuery, combine_scope_query, file_query, record_query};

/// the resource a decision is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    query: String,
    resource_id: Option<String>,
    file_name: Option<String>,
}

impl ResourceScope {
    /// scope of the record with persistent identifier `pi`.
    pub fn record(pi: &str) -> Self {
        Self {
            query: record_query(pi),
            resource_id: Some(pi.to_string()),
            file_name: None,
        }
    }

    /// scope of one file of record `pi`.
    pub fn file(pi: &str, file_name: &str) -> Self {
        Self {
            query: file_query(pi, file_name),
            resource_id: Some(pi.to_string()),
            file_name: Some(file_name.to_string()),
        }
    }

    /// the index query selecting the resource.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// the resource id, if known.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// the file name, if the scope is a single file.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

/// return the license types from `license_types` that govern the resource.
///
/// a license type is relevant when its name is one of `required` and its
/// scope (if any) covers the resource: the scope query must hit the
/// resource in the index and, for file scopes, the filename pattern must
/// match the whole file name. open access types are always relevant.
/// index errors propagate.
pub async fn relevant_license_types<'a, I: IndexQuery>(
    index: &I,
    license_types: &'a [LicenseType],
    required: &ConditionSet,
    scope: &ResourceScope,
) -> Result<Vec<&'a LicenseType>> {
    let mut relevant = Vec::new();

    for license_type in license_types {
        if !required.contains(&license_type.name) {
            continue;
        }
        if license_type.open_access {
            relevant.push(license_type);
            continue;
        }
        if covers(index, license_type, scope).await? {
            relevant.push(license_type);
        } else {
            debug!(
                license_type = %license_type.name,
                scope = scope.query(),
                "license type scope excludes resource"
            );
        }
    }

    Ok(relevant)
}

async fn covers<I: IndexQuery>(
    index: &I,
    license_type: &LicenseType,
    scope: &ResourceScope,
) -> Result<bool> {
    let Some(condition) = license_type
        .scope()
        .map_err(|cause| Error::InvalidScope {
            name: license_type.name.clone(),
            cause,
        })?
    else {
        return Ok(true);
    };

    if let Some(pattern) = &condition.file_name_pattern
        && let Some(file_name) = scope.file_name()
    {
        let re = Regex::new(&format!("^(?:{})$", pattern)).map_err(|cause| {
            Error::InvalidFilenamePattern {
                name: license_type.name.clone(),
                cause,
            }
        })?;
        if !re.is_match(file_name) {
            return Ok(false);
        }
    }

    match &condition.query {
        Some(query) => {
            let hits = index
                .hit_count(&combine_scope_query(scope.query(), query))
                .await?;
            Ok(hits > 0)
        }
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticIndex;
    use shelfguard_types::test_utils::TestLicenseTypeBuilder;

    fn names(types: &[&LicenseType]) -> Vec<String> {
        types.iter().map(|t| t.name.clone()).collect()
    }

    #[tokio::test]
    async fn unnamed_types_are_excluded() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("restricted").build(),
            TestLicenseTypeBuilder::new("embargoed").build(),
        ];
        let relevant = relevant_license_types(
            &StaticIndex::new(),
            &catalog,
            &ConditionSet::from_names(["restricted"]),
            &ResourceScope::record("R1"),
        )
        .await
        .unwrap();
        assert_eq!(names(&relevant), vec!["restricted"]);
    }

    #[tokio::test]
    async fn zero_hits_exclude_scoped_type() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("maps")
                .with_conditions("DOCSTRCT:map")
                .build(),
        ];
        let required = ConditionSet::from_names(["maps"]);

        let index = StaticIndex::new().with_hits(r#"+(PI:"R1") +(DOCSTRCT:map)"#, 1);
        let hit = relevant_license_types(&index, &catalog, &required, &ResourceScope::record("R1"))
            .await
            .unwrap();
        assert_eq!(names(&hit), vec!["maps"]);

        let miss = relevant_license_types(&index, &catalog, &required, &ResourceScope::record("R2"))
            .await
            .unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn negated_scope_is_not_grouped() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("not-maps")
                .with_conditions("-DOCSTRCT:map")
                .build(),
        ];
        let index = StaticIndex::new().with_default_hits(1);
        relevant_license_types(
            &index,
            &catalog,
            &ConditionSet::from_names(["not-maps"]),
            &ResourceScope::record("R1"),
        )
        .await
        .unwrap();
        assert_eq!(index.queries(), vec![r#"+(PI:"R1") -DOCSTRCT:map"#.to_string()]);
    }

    #[tokio::test]
    async fn open_access_types_skip_scope_checks() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("public")
                .open_access()
                .with_conditions("DOCSTRCT:map")
                .build(),
        ];
        let index = StaticIndex::unavailable();
        let relevant = relevant_license_types(
            &index,
            &catalog,
            &ConditionSet::from_names(["public"]),
            &ResourceScope::record("R1"),
        )
        .await
        .unwrap();
        assert_eq!(names(&relevant), vec!["public"]);
    }

    #[tokio::test]
    async fn filename_pattern_applies_to_file_scopes() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("masters")
                .with_conditions(r"FILENAME:{.*\.tif}")
                .build(),
        ];
        let required = ConditionSet::from_names(["masters"]);
        let index = StaticIndex::new();

        let tif = relevant_license_types(
            &index,
            &catalog,
            &required,
            &ResourceScope::file("R1", "00000001.tif"),
        )
        .await
        .unwrap();
        assert_eq!(names(&tif), vec!["masters"]);

        let jpg = relevant_license_types(
            &index,
            &catalog,
            &required,
            &ResourceScope::file("R1", "00000001.tif.jpg"),
        )
        .await
        .unwrap();
        assert!(jpg.is_empty());

        // record scopes have no file name to test against
        let record =
            relevant_license_types(&index, &catalog, &required, &ResourceScope::record("R1"))
                .await
                .unwrap();
        assert_eq!(names(&record), vec!["masters"]);
        assert!(index.queries().is_empty());
    }

    #[tokio::test]
    async fn bad_filename_pattern_is_an_error() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("broken")
                .with_conditions("FILENAME:{(}")
                .build(),
        ];
        let err = relevant_license_types(
            &StaticIndex::new(),
            &catalog,
            &ConditionSet::from_names(["broken"]),
            &ResourceScope::file("R1", "a.tif"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFilenamePattern { .. }));
    }

    #[tokio::test]
    async fn index_errors_propagate() {
        let catalog = vec![
            TestLicenseTypeBuilder::new("maps")
                .with_conditions("DOCSTRCT:map")
                .build(),
        ];
        let err = relevant_license_types(
            &StaticIndex::unavailable(),
            &catalog,
            &ConditionSet::from_names(["maps"]),
            &ResourceScope::record("R1"),
        )
        .await
        .unwrap_err();
        assert!(err.is_unavailable());
    }
}
