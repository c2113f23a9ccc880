//! license-based access control for shelfguard.
//!
//! this crate decides whether a caller may exercise a privilege on an
//! indexed resource. three independent trust sources are combined:
//! default grants of every relevant license type (all-of), matching network
//! ranges and the caller's own licenses (any-of, each source must satisfy
//! the whole condition set on its own).
//!
//! collaborators are injected through traits: [`IndexQuery`] evaluates
//! scope subqueries and [`PolicyStore`] provides the license type and
//! network range catalog.

#![warn(missing_docs)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod index;
pub mod licensee;
pub mod overrides;
pub mod policy;
pub mod relevance;
pub mod store;
pub mod test_utils;

pub use catalog::CachedPolicyStore;
pub use engine::{AccessEngine, Decision, EngineOptions, GrantReason};
pub use error::{Error, Result, ValidationError};
pub use index::{IndexDocument, IndexQuery};
pub use licensee::{Licensee, can_satisfy_all};
pub use overrides::OverrideGraph;
pub use policy::PolicyDocument;
pub use relevance::{ResourceScope, relevant_license_types};
pub use store::{MemoryPolicyStore, PolicyStore};
