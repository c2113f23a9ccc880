//! core types for shelfguard - license-based access control for digital library resources.
//!
//! this crate provides the policy data model shared by every other crate:
//! - [`Privilege`]: named capabilities such as viewing images or downloading a pdf
//! - [`AccessCondition`] / [`ConditionSet`]: labels an indexed resource carries
//! - [`LicenseType`]: a named bundle of default grants plus an optional resource scope
//! - [`License`]: a grant of a license type to a user or a network range
//! - [`User`] / [`NetworkRange`]: the two kinds of licensee
//! - [`Config`]: application configuration

mod access_condition;
mod config;
mod error;
mod license;
mod license_type;
mod network_range;
mod privilege;
pub mod test_utils;
mod user;

pub use access_condition::{AccessCondition, ConditionSet, OPEN_ACCESS};
pub use config::{AccessConfig, Config, DatabaseConfig, IndexConfig, SessionConfig};
pub use error::Error;
pub use license::{License, LicenseId, LicenseeRef};
pub use license_type::{CORE_LICENSE_TYPES, LicenseType, ScopeCondition};
pub use network_range::{NetworkRange, parse_subnet_mask};
pub use privilege::{PERMISSION_ATTRIBUTE_PREFIX, Privilege};
pub use user::{User, UserId};

/// result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
