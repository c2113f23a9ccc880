//! json policy documents.
//!
//! a policy document describes a whole catalog in one file:
//!
//! ```json
//! {
//!   "license_types": [
//!     {"name": "restricted", "privileges": ["view-thumbnails"]}
//!   ],
//!   "network_ranges": [
//!     {
//!       "name": "campus",
//!       "subnet_mask": "203.0.113.0/24",
//!       "licenses": [{"license_type": "restricted", "privileges": ["view-images"]}]
//!     }
//!   ],
//!   "users": [
//!     {"name": "reader", "licenses": [{"license_type": "restricted"}]}
//!   ]
//! }
//! ```
//!
//! licenses refer to license types by name and are resolved by
//! [`PolicyDocument::into_store`].

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfguard_types::{
    License, LicenseId, LicenseType, LicenseeRef, NetworkRange, Privilege, User, UserId,
    parse_subnet_mask,
};

use crate::error::{Error, ValidationError};
use crate::overrides::OverrideGraph;
use crate::store::MemoryPolicyStore;

/// a license as written in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSpec {
    /// name of the license type granted.
    pub license_type: String,

    /// narrowed privilege set; empty means "as the license type".
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
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

/// a network range as written in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// unique name.
    pub name: String,

    /// cidr or single address.
    pub subnet_mask: String,

    /// free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// licenses held by the range.
    #[serde(default)]
    pub licenses: Vec<GrantSpec>,
}

/// a user as written in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSpec {
    /// unique login name.
    pub name: String,

    /// email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// superusers satisfy every access condition.
    #[serde(default)]
    pub superuser: bool,

    /// inactive users hold no usable licenses.
    #[serde(default = "default_active")]
    pub active: bool,

    /// licenses held by the user.
    #[serde(default)]
    pub licenses: Vec<GrantSpec>,
}

fn default_active() -> bool {
    true
}

/// a complete policy catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// the license type catalog.
    #[serde(default)]
    pub license_types: Vec<LicenseType>,

    /// configured network ranges.
    #[serde(default)]
    pub network_ranges: Vec<RangeSpec>,

    /// users and their licenses.
    #[serde(default)]
    pub users: Vec<UserSpec>,
}

impl PolicyDocument {
    /// parse a policy document from json and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let document: PolicyDocument = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// fail on the first validation problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// every validation problem in the document.
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();

        let mut type_names = HashSet::new();
        for lt in &self.license_types {
            if !type_names.insert(lt.name.as_str()) {
                problems.push(ValidationError::DuplicateLicenseType(lt.name.clone()));
            }
            if let Err(cause) = lt.scope() {
                problems.push(ValidationError::InvalidScope {
                    name: lt.name.clone(),
                    cause,
                });
            }
        }

        let mut unknown_types = |holder: &str, grants: &[GrantSpec]| {
            for grant in grants {
                if !type_names.contains(grant.license_type.as_str()) {
                    problems.push(ValidationError::UnknownLicenseType {
                        holder: holder.to_string(),
                        name: grant.license_type.clone(),
                    });
                }
            }
        };

        let mut range_names = HashSet::new();
        let mut range_problems = Vec::new();
        for range in &self.network_ranges {
            if !range_names.insert(range.name.as_str()) {
                range_problems.push(ValidationError::DuplicateNetworkRange(range.name.clone()));
            }
            if let Err(cause) = parse_subnet_mask(&range.subnet_mask) {
                range_problems.push(ValidationError::InvalidSubnetMask {
                    name: range.name.clone(),
                    cause,
                });
            }
            unknown_types(&range.name, &range.licenses);
        }

        let mut user_names = HashSet::new();
        let mut user_problems = Vec::new();
        for user in &self.users {
            if !user_names.insert(user.name.as_str()) {
                user_problems.push(ValidationError::DuplicateUser(user.name.clone()));
            }
            unknown_types(&user.name, &user.licenses);
        }

        problems.extend(range_problems);
        problems.extend(user_problems);
        problems.extend(OverrideGraph::new(&self.license_types).findings());
        problems
    }

    /// resolve license type references and build an in-memory store.
    ///
    /// users are numbered from 1 and licenses from 1 in document order.
    pub fn into_store(self) -> Result<MemoryPolicyStore, Error> {
        self.validate()?;

        let types: HashMap<&str, &LicenseType> = self
            .license_types
            .iter()
            .map(|lt| (lt.name.as_str(), lt))
            .collect();
        let mut next_license = 1u64;
        let mut resolve = |licensee: LicenseeRef, grants: &[GrantSpec]| -> Vec<License> {
            grants
                .iter()
                .filter_map(|grant| {
                    let license_type = types.get(grant.license_type.as_str())?;
                    let license = License {
                        id: LicenseId(next_license),
                        license_type: (*license_type).clone(),
                        licensee: licensee.clone(),
                        privileges: grant.privileges.clone(),
                        conditions: grant.conditions.clone(),
                        start: grant.start,
                        end: grant.end,
                    };
                    next_license += 1;
                    Some(license)
                })
                .collect()
        };

        let mut network_ranges = Vec::with_capacity(self.network_ranges.len());
        for spec in &self.network_ranges {
            let mask = parse_subnet_mask(&spec.subnet_mask).map_err(|cause| {
                ValidationError::InvalidSubnetMask {
                    name: spec.name.clone(),
                    cause,
                }
            })?;
            let mut range = NetworkRange::new(spec.name.clone(), mask);
            range.description = spec.description.clone();
            range.licenses = resolve(LicenseeRef::NetworkRange(spec.name.clone()), &spec.licenses);
            network_ranges.push(range);
        }

        let mut users = Vec::with_capacity(self.users.len());
        for (i, spec) in self.users.iter().enumerate() {
            let id = UserId(i as u64 + 1);
            let mut user = User::new(id, spec.name.clone());
            user.email = spec.email.clone();
            user.superuser = spec.superuser;
            user.active = spec.active;
            user.licenses = resolve(LicenseeRef::User(id), &spec.licenses);
            users.push(user);
        }

        Ok(MemoryPolicyStore::new(
            self.license_types,
            network_ranges,
            users,
        ))
    }
}
