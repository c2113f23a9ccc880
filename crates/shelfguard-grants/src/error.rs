//! error types for shelfguard-grants.

use thiserror::Error;

/// errors that can occur while evaluating or loading policy.
///
/// none of these mean "access denied". [`Error::is_unavailable`] tells a
/// transport layer to answer with a service-unavailable outcome instead.
#[derive(Debug, Error)]
pub enum Error {
    /// the index query collaborator could not be reached or failed.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    /// reading license types, network ranges or licenses failed.
    #[error("policy store error: {0}")]
    PolicyStore(String),

    /// the resource identifier does not resolve to any indexed document.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// a license type carries a scope condition that cannot be parsed.
    #[error("invalid scope condition on license type {name}: {cause}")]
    InvalidScope {
        /// the license type name.
        name: String,
        /// the parse failure.
        cause: shelfguard_types::Error,
    },

    /// a license type carries a filename pattern that is not a valid regex.
    #[error("invalid filename pattern on license type {name}: {cause}")]
    InvalidFilenamePattern {
        /// the license type name.
        name: String,
        /// the regex compile failure.
        cause: regex::Error,
    },

    /// failed to parse a json policy document.
    #[error("failed to parse policy JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// a policy document failed validation.
    #[error("invalid policy: {0}")]
    InvalidPolicy(#[from] ValidationError),
}

impl Error {
    /// true if the error means "could not evaluate policy right now".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::IndexUnavailable(_) | Error::PolicyStore(_))
    }
}

/// problems found while validating a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// two license types share a name.
    #[error("duplicate license type: {0}")]
    DuplicateLicenseType(String),

    /// two network ranges share a name.
    #[error("duplicate network range: {0}")]
    DuplicateNetworkRange(String),

    /// two users share a name.
    #[error("duplicate user: {0}")]
    DuplicateUser(String),

    /// a license references a license type that does not exist.
    #[error("{holder} holds a license for unknown license type {name}")]
    UnknownLicenseType {
        /// the licensee holding the license.
        holder: String,
        /// the missing license type name.
        name: String,
    },

    /// a license type's scope condition is malformed.
    #[error("license type {name} has an invalid scope condition: {cause}")]
    InvalidScope {
        /// the license type name.
        name: String,
        /// the parse failure.
        cause: shelfguard_types::Error,
    },

    /// a network range mask cannot be parsed.
    #[error("network range {name} has an invalid subnet mask: {cause}")]
    InvalidSubnetMask {
        /// the network range name.
        name: String,
        /// the parse failure.
        cause: shelfguard_types::Error,
    },

    /// a license type overrides a name that does not exist.
    #[error("license type {name} overrides unknown license type {target}")]
    UnknownOverride {
        /// the overriding license type.
        name: String,
        /// the missing target.
        target: String,
    },

    /// a license type (transitively) overrides itself.
    #[error("license type {0} is part of an override cycle")]
    OverrideCycle(String),
}

/// result type for shelfguard-grants operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outages_are_not_denials() {
        assert!(Error::IndexUnavailable("timeout".into()).is_unavailable());
        assert!(Error::PolicyStore("locked".into()).is_unavailable());
        assert!(!Error::ResourceNotFound("PPN123".into()).is_unavailable());
    }
}
