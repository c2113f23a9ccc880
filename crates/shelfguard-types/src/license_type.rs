//! license types: named bundles of default grants with an optional resource scope.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::privilege::Privilege;

/// marker opening the filename part of a scope condition.
const FILENAME_MARKER: &str = "FILENAME:{";

/// license types the application relies on, seeded at startup if absent.
///
/// each entry is `(name, description)`. core types grant nothing by default;
/// their privileges are handed out through licenses.
pub const CORE_LICENSE_TYPES: &[(&str, &str)] = &[
    ("licenseType_cms", "cms editing rights"),
    (
        "licenseType_setRepresentativeImage",
        "permission to choose the representative image of a record",
    ),
    (
        "licenseType_deleteOcrPage",
        "permission to delete the ocr of single pages",
    ),
    (
        "licenseType_crowdsourcing_campaigns",
        "access to crowdsourcing campaigns",
    ),
];

/// a named policy object governing resources that carry its name as access condition.
///
/// `privileges` are granted by default to everyone who does not hold a
/// contradicting grant. an `open_access` license type always grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseType {
    /// unique name; equals the access condition label it governs.
    pub name: String,

    /// free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// privileges granted by default.
    #[serde(default)]
    pub privileges: BTreeSet<Privilege>,

    /// open access types grant every privilege.
    #[serde(default)]
    pub open_access: bool,

    /// resource scope expression, see [`ScopeCondition`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,

    /// names of license types this one overrides.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub overrides: BTreeSet<String>,
}

impl LicenseType {
    /// create a license type with no default privileges.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::BlankLicenseTypeName);
        }
        Ok(Self {
            name,
            description: None,
            privileges: BTreeSet::new(),
            open_access: false,
            conditions: None,
            overrides: BTreeSet::new(),
        })
    }

    /// true if `privilege` is granted to everyone by this type.
    pub fn grants_by_default(&self, privilege: &Privilege) -> bool {
        self.open_access || self.privileges.contains(privilege)
    }

    /// parsed scope condition, if the type carries a non-empty one.
    pub fn scope(&self) -> Result<Option<ScopeCondition>, Error> {
        match self.conditions.as_deref() {
            Some(raw) if !raw.trim().is_empty() => ScopeCondition::parse(raw).map(Some),
            _ => Ok(None),
        }
    }

    /// true if this is one of the [`CORE_LICENSE_TYPES`].
    pub fn is_core(&self) -> bool {
        CORE_LICENSE_TYPES.iter().any(|(name, _)| *name == self.name)
    }

    /// instantiate every core license type.
    pub fn core_types() -> Vec<LicenseType> {
        CORE_LICENSE_TYPES
            .iter()
            .map(|(name, description)| LicenseType {
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                privileges: BTreeSet::new(),
                open_access: false,
                conditions: None,
                overrides: BTreeSet::new(),
            })
            .collect()
    }
}

/// a license type's resource scope, split into an index query and a filename pattern.
///
/// the raw form is an index query that may contain one `FILENAME:{<regex>}` block:
///
/// ```
/// use shelfguard_types::ScopeCondition;
///
/// let scope = ScopeCondition::parse("DOCSTRCT:monograph FILENAME:{.*\\.tif}").unwrap();
/// assert_eq!(scope.query.as_deref(), Some("DOCSTRCT:monograph"));
/// assert_eq!(scope.file_name_pattern.as_deref(), Some(".*\\.tif"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCondition {
    /// index query part, if any.
    pub query: Option<String>,
    /// filename regex part, if any.
    pub file_name_pattern: Option<String>,
}

impl ScopeCondition {
    /// split a raw scope expression.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let Some(start) = raw.find(FILENAME_MARKER) else {
            return Ok(Self {
                query: non_blank(raw),
                file_name_pattern: None,
            });
        };

        let pattern_start = start + FILENAME_MARKER.len();
        let pattern_len = closing_brace(&raw[pattern_start..])
            .ok_or_else(|| Error::InvalidScopeCondition(raw.to_string()))?;
        let pattern = &raw[pattern_start..pattern_start + pattern_len];
        let rest = format!(
            "{} {}",
            &raw[..start],
            &raw[pattern_start + pattern_len + 1..]
        );

        Ok(Self {
            query: non_blank(&rest),
            file_name_pattern: non_blank(pattern),
        })
    }
}

/// byte length up to the brace closing an already opened block.
fn closing_brace(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
