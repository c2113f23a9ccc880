//! shelfguard - license-based access control for digital library resources.
//!
//! this crate wires the policy engine to its production collaborators:
//! - [`SolrIndex`]: index queries against a solr core
//! - [`CallerResolver`]: caller identity from user name and peer address
//! - [`AccessService`]: record and file checks with session caching
//! - [`cli`]: the operator command line

pub mod caller;
pub mod cli;
pub mod service;
pub mod solr;

pub use caller::{Caller, CallerResolver};
pub use service::AccessService;
pub use solr::SolrIndex;
