//! error types for shelfguard-types.

use thiserror::Error;

/// errors raised while constructing validated policy types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// access condition labels must not be empty.
    #[error("access condition cannot be empty")]
    EmptyCondition,

    /// license type names must not be blank.
    #[error("license type name cannot be blank")]
    BlankLicenseTypeName,

    /// subnet mask is neither a cidr nor a single address.
    #[error("invalid subnet mask: {0}")]
    InvalidSubnetMask(String),

    /// scope condition has an unterminated `FILENAME:{...}` block.
    #[error("invalid scope condition: {0}")]
    InvalidScopeCondition(String),
}
