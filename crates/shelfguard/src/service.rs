//! access checks for records and files.
//!
//! [`AccessService`] looks up a resource's access conditions in the index,
//! loads the license type catalog and asks the [`AccessEngine`]. file checks
//! go through the session [`DecisionCache`]: one miss decides every file of
//! the record at once.

use std::collections::HashMap;

use shelfguard_grants::index::{fields, file_query, pages_query, record_query};
use shelfguard_grants::{
    AccessEngine, Decision, Error, IndexDocument, IndexQuery, PolicyStore, ResourceScope, Result,
};
use shelfguard_state::{DecisionCache, SessionId, SessionStore, WILDCARD_FILE};
use shelfguard_types::{ConditionSet, Privilege};
use tracing::debug;

use crate::caller::Caller;

/// record and file access checks over an engine and a session cache.
pub struct AccessService<S, I, T> {
    engine: AccessEngine<S, I>,
    cache: DecisionCache<T>,
}

impl<S, I, T> AccessService<S, I, T>
where
    S: PolicyStore,
    I: IndexQuery,
    T: SessionStore,
{
    /// create a service over `engine`, caching file decisions in `sessions`.
    pub fn new(engine: AccessEngine<S, I>, sessions: T) -> Self {
        Self {
            engine,
            cache: DecisionCache::new(sessions),
        }
    }

    /// the decision engine.
    pub fn engine(&self) -> &AccessEngine<S, I> {
        &self.engine
    }

    /// the session decision cache.
    pub fn cache(&self) -> &DecisionCache<T> {
        &self.cache
    }

    /// may `caller` exercise `privilege` on record `pi`?
    ///
    /// # Panics
    ///
    /// panics if `pi` is blank.
    pub async fn record_access(
        &self,
        caller: &Caller,
        pi: &str,
        privilege: &Privilege,
    ) -> Result<bool> {
        self.record_decision(caller, pi, privilege)
            .await
            .map(|d| d.is_granted())
    }

    /// like [`AccessService::record_access`], reporting the deciding step.
    pub async fn record_decision(
        &self,
        caller: &Caller,
        pi: &str,
        privilege: &Privilege,
    ) -> Result<Decision> {
        assert!(!pi.trim().is_empty(), "record identifier must not be blank");

        let doc = self.single_document(&record_query(pi), pi).await?;
        let required = conditions_of(&doc);
        self.explain(caller, &required, privilege, &ResourceScope::record(pi))
            .await
    }

    /// the decision for one file of record `pi`, bypassing the session cache.
    ///
    /// # Panics
    ///
    /// panics if `pi` or `file` is blank.
    pub async fn file_decision(
        &self,
        caller: &Caller,
        pi: &str,
        file: &str,
        privilege: &Privilege,
    ) -> Result<Decision> {
        assert!(!pi.trim().is_empty(), "record identifier must not be blank");
        assert!(!file.trim().is_empty(), "file name must not be blank");

        let doc = self
            .single_document(&file_query(pi, file), &format!("{}/{}", pi, file))
            .await?;
        let required = conditions_of(&doc);
        self.explain(caller, &required, privilege, &ResourceScope::file(pi, file))
            .await
    }

    /// may `caller` exercise `privilege` on `file` of record `pi`?
    ///
    /// answered from the session when possible. `file` may be
    /// [`WILDCARD_FILE`], which is granted when every file of the record is.
    ///
    /// # Panics
    ///
    /// panics if `pi` or `file` is blank.
    pub async fn file_access(
        &self,
        session: &SessionId,
        caller: &Caller,
        pi: &str,
        file: &str,
        privilege: &Privilege,
    ) -> Result<bool> {
        assert!(!pi.trim().is_empty(), "record identifier must not be blank");
        assert!(!file.trim().is_empty(), "file name must not be blank");

        self.cache
            .check_cached(session, pi, file, privilege, || {
                self.file_batch(caller, pi, privilege)
            })
            .await
    }

    /// decide every page file of record `pi`.
    ///
    /// the [`WILDCARD_FILE`] entry is true when the record has pages and all
    /// of them are granted. a record without page documents is
    /// [`Error::ResourceNotFound`].
    async fn file_batch(
        &self,
        caller: &Caller,
        pi: &str,
        privilege: &Privilege,
    ) -> Result<HashMap<String, bool>> {
        let pages = self
            .engine
            .index()
            .search(&pages_query(pi), &[fields::FILENAME, fields::ACCESSCONDITION])
            .await?;
        if pages.is_empty() {
            return Err(Error::ResourceNotFound(pi.to_string()));
        }
        let license_types = self.engine.store().license_types().await?;

        let mut batch = HashMap::with_capacity(pages.len() + 1);
        for page in &pages {
            let Some(file) = page.first(fields::FILENAME) else {
                continue;
            };
            let granted = self
                .engine
                .decide(
                    &license_types,
                    &conditions_of(page),
                    privilege,
                    caller.licensee(),
                    caller.address,
                    &ResourceScope::file(pi, file),
                )
                .await?;
            batch.insert(file.to_string(), granted);
        }

        let all = !batch.is_empty() && batch.values().all(|granted| *granted);
        batch.insert(WILDCARD_FILE.to_string(), all);
        debug!(pi, %privilege, files = batch.len() - 1, "decided file batch");
        Ok(batch)
    }

    async fn explain(
        &self,
        caller: &Caller,
        required: &ConditionSet,
        privilege: &Privilege,
        scope: &ResourceScope,
    ) -> Result<Decision> {
        let license_types = self.engine.store().license_types().await?;
        self.engine
            .explain(
                &license_types,
                required,
                privilege,
                caller.licensee(),
                caller.address,
                scope,
            )
            .await
    }

    async fn single_document(&self, query: &str, resource: &str) -> Result<IndexDocument> {
        self.engine
            .index()
            .search(query, &[fields::ACCESSCONDITION])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ResourceNotFound(resource.to_string()))
    }
}

fn conditions_of(doc: &IndexDocument) -> ConditionSet {
    ConditionSet::from_names(doc.values(fields::ACCESSCONDITION))
}
