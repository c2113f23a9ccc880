//! licenses: grants of a license type to one licensee.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::license_type::LicenseType;
use crate::privilege::Privilege;
use crate::user::UserId;

/// unique identifier for a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LicenseId(pub u64);

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// who holds a license.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LicenseeRef {
    /// an authenticated user.
    User(UserId),
    /// a named network range.
    NetworkRange(String),
}

/// a grant relating one licensee to one license type.
///
/// a license may narrow the type's privileges; when `privileges` is empty
/// the license type's own set applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// unique identifier (0 until persisted).
    #[serde(default = "unsaved_id")]
    pub id: LicenseId,

    /// the license type this license grants.
    pub license_type: LicenseType,

    /// the holder.
    pub licensee: LicenseeRef,

    /// narrowed privilege set; empty means "as the license type".
    #[serde(default)]
    pub privileges: BTreeSet<Privilege>,

    /// index query restricting which resources the license covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,

    /// start of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    /// end of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

fn unsaved_id() -> LicenseId {
    LicenseId(0)
}

impl License {
    /// create an unrestricted license of `license_type` for `licensee`.
    pub fn new(license_type: LicenseType, licensee: LicenseeRef) -> Self {
        Self {
            id: LicenseId(0),
            license_type,
            licensee,
            privileges: BTreeSet::new(),
            conditions: None,
            start: None,
            end: None,
        }
    }

    /// the privileges this license actually grants.
    pub fn effective_privileges(&self) -> &BTreeSet<Privilege> {
        if self.privileges.is_empty() {
            &self.license_type.privileges
        } else {
            &self.privileges
        }
    }

    /// true if the license grants `privilege`.
    pub fn grants(&self, privilege: &Privilege) -> bool {
        self.effective_privileges().contains(privilege)
    }

    /// true if the license is named after `condition` (exact match).
    pub fn covers_condition(&self, condition: &str) -> bool {
        self.license_type.name == condition
    }

    /// true if `now` falls inside the validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| start <= now) && self.end.is_none_or(|end| now <= end)
    }

    /// the resource scoping query, if non-blank.
    pub fn resource_conditions(&self) -> Option<&str> {
        self.conditions
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
