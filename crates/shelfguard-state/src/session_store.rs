//! per-session decision state.
//!
//! each caller session owns one [`SessionDecisions`] behind its own mutex,
//! so requests of different sessions never contend and requests of the same
//! session are serialized.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// opaque identifier of a caller session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// wrap a session identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// cached decisions of one session.
///
/// decisions are grouped by session attribute (see
/// [`Privilege::cache_attribute`](shelfguard_types::Privilege::cache_attribute))
/// and keyed by `resource + "_" + file`.
#[derive(Debug, Default)]
pub struct SessionDecisions {
    current_resource: Option<String>,
    by_attribute: HashMap<String, HashMap<String, bool>>,
}

impl SessionDecisions {
    /// the resource the cached decisions belong to.
    pub fn current_resource(&self) -> Option<&str> {
        self.current_resource.as_deref()
    }

    /// drop every cached decision and remember `resource_id` as current.
    pub fn reset(&mut self, resource_id: &str) {
        self.by_attribute.clear();
        self.current_resource = Some(resource_id.to_string());
    }

    /// a cached decision.
    pub fn get(&self, attribute: &str, key: &str) -> Option<bool> {
        self.by_attribute
            .get(attribute)
            .and_then(|decisions| decisions.get(key))
            .copied()
    }

    /// cache a decision.
    pub fn insert(&mut self, attribute: &str, key: String, granted: bool) {
        self.by_attribute
            .entry(attribute.to_string())
            .or_default()
            .insert(key, granted);
    }

    /// number of cached decisions across all attributes.
    pub fn len(&self) -> usize {
        self.by_attribute.values().map(HashMap::len).sum()
    }

    /// true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// shared handle to one session's decisions.
pub type SharedDecisions = Arc<Mutex<SessionDecisions>>;

/// storage for per-session decision state.
pub trait SessionStore: Send + Sync {
    /// the state of `session`, created empty on first use.
    fn session(&self, session: &SessionId) -> impl Future<Output = SharedDecisions> + Send;

    /// forget a session (e.g. on logout).
    fn remove(&self, session: &SessionId) -> impl Future<Output = ()> + Send;
}

impl<T: SessionStore> SessionStore for Arc<T> {
    fn session(&self, session: &SessionId) -> impl Future<Output = SharedDecisions> + Send {
        (**self).session(session)
    }

    fn remove(&self, session: &SessionId) -> impl Future<Output = ()> + Send {
        (**self).remove(session)
    }
}

#[derive(Debug)]
struct Entry {
    decisions: SharedDecisions,
    last_access: Instant,
}

/// in-process session store.
///
/// with a maximum idle time set, idle sessions are evicted whenever a new
/// session is opened.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    max_idle: Option<Duration>,
}

impl MemorySessionStore {
    /// create an empty store that never evicts on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// create an empty store evicting sessions idle for longer than `max_idle`.
    pub fn with_max_idle(max_idle: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            max_idle: Some(max_idle),
        }
    }

    /// number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// true if no session is live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// drop sessions not used for longer than `max_idle`.
    ///
    /// returns the number of sessions removed.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        evict_idle(&mut *self.sessions.write().await, max_idle)
    }
}

fn evict_idle(sessions: &mut HashMap<SessionId, Entry>, max_idle: Duration) -> usize {
    let before = sessions.len();
    let now = Instant::now();
    sessions.retain(|_, entry| now.duration_since(entry.last_access) < max_idle);
    let purged = before - sessions.len();
    if purged > 0 {
        debug!(purged, remaining = sessions.len(), "purged idle sessions");
    }
    purged
}

impl SessionStore for MemorySessionStore {
    fn session(&self, session: &SessionId) -> impl Future<Output = SharedDecisions> + Send {
        let session = session.clone();
        async move {
            let mut sessions = self.sessions.write().await;
            if let Some(max_idle) = self.max_idle
                && !sessions.contains_key(&session)
            {
                evict_idle(&mut sessions, max_idle);
            }
            let entry = sessions.entry(session).or_insert_with(|| Entry {
                decisions: Arc::new(Mutex::new(SessionDecisions::default())),
                last_access: Instant::now(),
            });
            entry.last_access = Instant::now();
            Arc::clone(&entry.decisions)
        }
    }

    fn remove(&self, session: &SessionId) -> impl Future<Output = ()> + Send {
        let session = session.clone();
        async move {
            self.sessions.write().await.remove(&session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_session_shares_state() {
        let store = MemorySessionStore::new();
        let id = SessionId::from("abc");

        let a = store.session(&id).await;
        let b = store.session(&id).await;
        assert!(Arc::ptr_eq(&a, &b));

        let other = store.session(&SessionId::from("def")).await;
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(store.len().await, 2);

        store.remove(&id).await;
        assert_eq!(store.len().await, 1);
        let fresh = store.session(&id).await;
        assert!(!Arc::ptr_eq(&a, &fresh));
    }

    #[tokio::test]
    async fn purge_idle_sessions() {
        let store = MemorySessionStore::new();
        store.session(&SessionId::from("abc")).await;

        assert_eq!(store.purge_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.len().await, 1);

        assert_eq!(store.purge_idle(Duration::ZERO).await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn opening_a_session_evicts_idle_ones() {
        let store = MemorySessionStore::with_max_idle(Duration::from_millis(10));
        let first = store.session(&SessionId::from("abc")).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        // reusing a session keeps it alive
        let again = store.session(&SessionId::from("abc")).await;
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        store.session(&SessionId::from("def")).await;
        assert_eq!(store.len().await, 1);
        let fresh = store.session(&SessionId::from("abc")).await;
        assert!(!Arc::ptr_eq(&first, &fresh));
    }

    #[test]
    fn reset_clears_every_attribute() {
        let mut decisions = SessionDecisions::default();
        decisions.reset("R1");
        decisions.insert("permission_view-images", "R1_a.tif".to_string(), true);
        decisions.insert("permission_download-pdf", "R1_a.tif".to_string(), false);
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions.get("permission_download-pdf", "R1_a.tif"), Some(false));

        decisions.reset("R2");
        assert!(decisions.is_empty());
        assert_eq!(decisions.current_resource(), Some("R2"));
    }
}
