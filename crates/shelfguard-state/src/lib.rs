//! session state for shelfguard.
//!
//! decisions for the files of one resource are computed in a batch and
//! kept in the caller's session until the caller moves to another resource.

#![warn(missing_docs)]

pub mod decision_cache;
pub mod session_store;

pub use decision_cache::{DecisionCache, WILDCARD_FILE, cache_key};
pub use session_store::{MemorySessionStore, SessionDecisions, SessionId, SessionStore, SharedDecisions};
