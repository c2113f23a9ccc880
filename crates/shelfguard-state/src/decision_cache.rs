//! memoization of file-level decisions within one caller session.

use std::collections::HashMap;
use std::future::Future;

use shelfguard_grants::Result;
use shelfguard_types::Privilege;
use tracing::debug;

use crate::session_store::{SessionId, SessionStore};

/// file id standing for "every file of the resource".
pub const WILDCARD_FILE: &str = "*";

/// key of one cached decision.
pub fn cache_key(resource_id: &str, file_id: &str) -> String {
    format!("{}_{}", resource_id, file_id)
}

/// session-scoped cache in front of the access engine.
///
/// a session only ever caches decisions for one resource: moving to a
/// different resource id discards everything cached before.
#[derive(Debug, Clone, Default)]
pub struct DecisionCache<S> {
    sessions: S,
}

impl<S: SessionStore> DecisionCache<S> {
    /// create a cache backed by `sessions`.
    pub fn new(sessions: S) -> Self {
        Self { sessions }
    }

    /// the session store.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// return the cached decision for `file_id`, computing it on a miss.
    ///
    /// on a miss `decide` is called once and must return decisions for
    /// every file of the resource it could resolve (including
    /// [`WILDCARD_FILE`] when asked for it); all of them are cached. a file
    /// missing from that batch is denied. errors from `decide` are returned
    /// and nothing is cached.
    ///
    /// the session lock is held from the resource check until the batch is
    /// stored, so concurrent requests of one session compute a batch once.
    pub async fn check_cached<F, Fut>(
        &self,
        session: &SessionId,
        resource_id: &str,
        file_id: &str,
        privilege: &Privilege,
        decide: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HashMap<String, bool>>>,
    {
        let state = self.sessions.session(session).await;
        let mut state = state.lock().await;

        if state.current_resource() != Some(resource_id) {
            debug!(
                %session,
                from = state.current_resource().unwrap_or("-"),
                to = resource_id,
                "resetting session decisions"
            );
            state.reset(resource_id);
        }

        let attribute = privilege.cache_attribute();
        let key = cache_key(resource_id, file_id);
        if let Some(granted) = state.get(&attribute, &key) {
            return Ok(granted);
        }

        let decisions = decide().await?;
        debug!(%session, resource_id, %privilege, files = decisions.len(), "caching decisions");
        for (file, granted) in decisions {
            state.insert(&attribute, cache_key(resource_id, &file), granted);
        }

        Ok(state.get(&attribute, &key).unwrap_or(false))
    }
}
