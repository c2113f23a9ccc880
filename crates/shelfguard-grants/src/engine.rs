//! the access decision engine.

use std::fmt;
use std::net::IpAddr;

use shelfguard_types::{AccessConfig, ConditionSet, LicenseType, Privilege};
use tracing::{debug, warn};

use crate::error::Result;
use crate::index::IndexQuery;
use crate::licensee::{Licensee, can_satisfy_all};
use crate::relevance::{ResourceScope, relevant_license_types};
use crate::store::PolicyStore;

/// switches that change how the engine treats callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// grant everything to callers on a loopback address.
    pub full_access_for_localhost: bool,
}

impl From<&AccessConfig> for EngineOptions {
    fn from(config: &AccessConfig) -> Self {
        Self {
            full_access_for_localhost: config.full_access_for_localhost,
        }
    }
}

/// why a request was granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantReason {
    /// the resource declares no access conditions.
    NoConditions,
    /// the resource is open access.
    OpenAccess,
    /// the license type catalog is empty or the privilege is blank.
    MissingPolicyContext,
    /// none of the resource's license types apply to it.
    NoRelevantLicenseTypes,
    /// every relevant license type grants the privilege by default.
    DefaultGrant,
    /// loopback caller with full localhost access enabled.
    Localhost,
    /// a matching network range satisfies every condition.
    NetworkRange(String),
    /// the licensee satisfies every condition.
    Licensee(String),
}

impl fmt::Display for GrantReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantReason::NoConditions => write!(f, "resource has no access conditions"),
            GrantReason::OpenAccess => write!(f, "resource is open access"),
            GrantReason::MissingPolicyContext => {
                write!(f, "no license types configured or blank privilege (fail-open)")
            }
            GrantReason::NoRelevantLicenseTypes => write!(f, "no license type applies"),
            GrantReason::DefaultGrant => write!(f, "granted by default"),
            GrantReason::Localhost => write!(f, "full access for localhost"),
            GrantReason::NetworkRange(name) => write!(f, "network range {}", name),
            GrantReason::Licensee(name) => write!(f, "licensee {}", name),
        }
    }
}

/// the outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// access granted, with the step that granted it.
    Granted(GrantReason),
    /// no trust source satisfied the conditions.
    Denied,
}

impl Decision {
    /// true if access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Granted(reason) => write!(f, "granted ({})", reason),
            Decision::Denied => write!(f, "denied"),
        }
    }
}

/// access decision engine.
///
/// holds the policy store (for network ranges) and the index (for scope
/// subqueries). cheap to clone when both collaborators are.
///
/// a decision combines three trust sources: default grants (all relevant
/// license types must agree), network ranges and the licensee (each must
/// satisfy the whole condition set on its own).
pub struct AccessEngine<S, I> {
    store: S,
    index: I,
    options: EngineOptions,
}

impl<S: Clone, I: Clone> Clone for AccessEngine<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            index: self.index.clone(),
            options: self.options,
        }
    }
}

impl<S: PolicyStore, I: IndexQuery> AccessEngine<S, I> {
    /// create an engine over the given collaborators.
    pub fn new(store: S, index: I, options: EngineOptions) -> Self {
        Self {
            store,
            index,
            options,
        }
    }

    /// the policy store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// the index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// the engine's switches.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// decide whether access is granted.
    ///
    /// see [`AccessEngine::explain`].
    pub async fn decide(
        &self,
        license_types: &[LicenseType],
        required: &ConditionSet,
        privilege: &Privilege,
        licensee: Option<&dyn Licensee>,
        caller: Option<IpAddr>,
        scope: &ResourceScope,
    ) -> Result<bool> {
        self.explain(license_types, required, privilege, licensee, caller, scope)
            .await
            .map(|d| d.is_granted())
    }

    /// decide whether access is granted and report which step decided.
    ///
    /// steps, in order; the first that grants wins:
    /// 1. no required conditions
    /// 2. the single condition is open access (case-insensitive)
    /// 3. empty license type catalog or blank privilege (fail-open)
    /// 4. no license type is relevant to the resource
    /// 5. every relevant license type grants the privilege by default
    /// 6. loopback caller with full localhost access, or a network range
    ///    matching the caller satisfies every relevant condition
    /// 7. the licensee satisfies every relevant condition for the resource
    ///
    /// otherwise access is denied. index and store failures are returned as
    /// errors, never as a denial.
    pub async fn explain(
        &self,
        license_types: &[LicenseType],
        required: &ConditionSet,
        privilege: &Privilege,
        licensee: Option<&dyn Licensee>,
        caller: Option<IpAddr>,
        scope: &ResourceScope,
    ) -> Result<Decision> {
        if required.is_empty() {
            return Ok(Decision::Granted(GrantReason::NoConditions));
        }
        if required.is_open_access_only() {
            return Ok(Decision::Granted(GrantReason::OpenAccess));
        }
        if license_types.is_empty() || privilege.is_blank() {
            warn!(
                %privilege,
                license_types = license_types.len(),
                "missing policy context, granting access"
            );
            return Ok(Decision::Granted(GrantReason::MissingPolicyContext));
        }

        let relevant = relevant_license_types(&self.index, license_types, required, scope).await?;
        if relevant.is_empty() {
            debug!(%required, scope = scope.query(), "no relevant license types");
            return Ok(Decision::Granted(GrantReason::NoRelevantLicenseTypes));
        }

        if relevant.iter().all(|lt| lt.grants_by_default(privilege)) {
            debug!(%privilege, %required, "granted by default");
            return Ok(Decision::Granted(GrantReason::DefaultGrant));
        }
        // only restrictive types that survived filtering constrain the remaining
        // steps; open access types are never checked against ranges or licensees
        let conditions = ConditionSet::from_names(
            relevant
                .iter()
                .filter(|lt| !lt.open_access)
                .map(|lt| lt.name.as_str()),
        );

        if let Some(addr) = caller {
            if self.options.full_access_for_localhost && addr.to_canonical().is_loopback() {
                debug!(%addr, "full access for localhost");
                return Ok(Decision::Granted(GrantReason::Localhost));
            }

            let ranges = self.store.network_ranges().await?;
            for range in ranges.iter().filter(|r| r.matches(addr)) {
                if can_satisfy_all(range, &conditions, privilege, None, &self.index).await? {
                    debug!(%addr, range = %range.name, %conditions, "granted by network range");
                    return Ok(Decision::Granted(GrantReason::NetworkRange(
                        range.name.clone(),
                    )));
                }
            }
        }

        if let Some(licensee) = licensee
            && can_satisfy_all(
                licensee,
                &conditions,
                privilege,
                scope.resource_id(),
                &self.index,
            )
            .await?
        {
            debug!(
                licensee = licensee.licensee_name(),
                %conditions,
                "granted by licensee"
            );
            return Ok(Decision::Granted(GrantReason::Licensee(
                licensee.licensee_name().to_string(),
            )));
        }

        debug!(%privilege, %conditions, scope = scope.query(), "access denied");
        Ok(Decision::Denied)
    }
}
