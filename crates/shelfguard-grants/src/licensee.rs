//! the licensee capability shared by users and network ranges.

use chrono::Utc;
use shelfguard_types::{ConditionSet, License, NetworkRange, Privilege, User};
use tracing::debug;

use crate::error::Result;
use crate::index::{IndexQuery, combine_scope_query, record_query};

/// any holder of licenses.
///
/// the engine never looks at user or network range internals; it only asks
/// [`can_satisfy_all`] about a licensee.
pub trait Licensee: Send + Sync {
    /// label used in logs and decision reasons.
    fn licensee_name(&self) -> &str;

    /// every license held.
    fn licenses(&self) -> &[License];

    /// licensees that satisfy every condition without holding licenses.
    fn has_unrestricted_access(&self) -> bool {
        false
    }

    /// inactive licensees satisfy nothing.
    fn is_active(&self) -> bool {
        true
    }
}

impl Licensee for User {
    fn licensee_name(&self) -> &str {
        &self.name
    }

    fn licenses(&self) -> &[License] {
        &self.licenses
    }

    fn has_unrestricted_access(&self) -> bool {
        self.superuser
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Licensee for NetworkRange {
    fn licensee_name(&self) -> &str {
        &self.name
    }

    fn licenses(&self) -> &[License] {
        &self.licenses
    }
}

/// check whether `licensee` satisfies every condition in `conditions` for `privilege`.
///
/// each condition must be covered by a license that is named after it, is
/// currently valid and grants the privilege. when `resource_id` is given,
/// a license carrying its own resource conditions only counts if the index
/// confirms those conditions hit the resource. candidates are visited in
/// license type name, then license id order, so the outcome (and the index
/// queries issued) are deterministic.
pub async fn can_satisfy_all<L, I>(
    licensee: &L,
    conditions: &ConditionSet,
    privilege: &Privilege,
    resource_id: Option<&str>,
    index: &I,
) -> Result<bool>
where
    L: Licensee + ?Sized,
    I: IndexQuery,
{
    if !licensee.is_active() {
        return Ok(false);
    }
    if licensee.has_unrestricted_access() {
        debug!(licensee = licensee.licensee_name(), "unrestricted licensee");
        return Ok(true);
    }

    let now = Utc::now();
    let mut candidates: Vec<&License> = licensee
        .licenses()
        .iter()
        .filter(|l| l.is_valid_at(now) && l.grants(privilege))
        .collect();
    candidates.sort_by(|a, b| {
        (a.license_type.name.as_str(), a.id).cmp(&(b.license_type.name.as_str(), b.id))
    });

    for condition in conditions {
        let mut satisfied = false;
        for license in candidates
            .iter()
            .filter(|l| l.covers_condition(condition.as_str()))
        {
            if license_covers_resource(license, resource_id, index).await? {
                satisfied = true;
                break;
            }
        }

        if !satisfied {
            debug!(
                licensee = licensee.licensee_name(),
                %condition,
                %privilege,
                "condition not satisfied"
            );
            return Ok(false);
        }
    }

    Ok(true)
}

/// true if the license applies to `resource_id`.
async fn license_covers_resource<I: IndexQuery>(
    license: &License,
    resource_id: Option<&str>,
    index: &I,
) -> Result<bool> {
    match (resource_id, license.resource_conditions()) {
        (Some(pi), Some(conditions)) => {
            let query = combine_scope_query(&record_query(pi), conditions);
            Ok(index.hit_count(&query).await? > 0)
        }
        _ => Ok(true),
    }
}
