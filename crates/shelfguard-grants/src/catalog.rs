//! process-wide cache of the policy catalog.
//!
//! license types and network ranges are read on every decision but change
//! only on administrative edits. [`CachedPolicyStore`] keeps one shared
//! snapshot and rebuilds it lazily: [`CachedPolicyStore::invalidate`] bumps
//! a generation counter and the first read after that reloads from the
//! wrapped store.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shelfguard_types::{LicenseType, NetworkRange, User};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::store::PolicyStore;

struct Snapshot {
    license_types: Arc<Vec<LicenseType>>,
    network_ranges: Arc<Vec<NetworkRange>>,
    generation: u64,
}

/// a [`PolicyStore`] caching the catalog of another store.
///
/// readers share `Arc` snapshots, so a rebuild never exposes a half-updated
/// catalog. user lookups are passed through uncached.
pub struct CachedPolicyStore<S> {
    inner: S,
    snapshot: RwLock<Option<Snapshot>>,
    /// bumped on each invalidation
    generation: AtomicU64,
    /// generation of the current snapshot (0 = never loaded)
    cached_generation: AtomicU64,
}

impl<S: PolicyStore> CachedPolicyStore<S> {
    /// wrap `inner`; nothing is loaded until the first read.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(1),
            cached_generation: AtomicU64::new(0),
        }
    }

    /// mark the catalog stale; the next read reloads it.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn snapshot(&self) -> Result<(Arc<Vec<LicenseType>>, Arc<Vec<NetworkRange>>)> {
        let current_gen = self.generation.load(Ordering::Acquire);

        if current_gen == self.cached_generation.load(Ordering::Acquire) {
            let guard = self.snapshot.read().await;
            if let Some(snap) = guard.as_ref() {
                return Ok((
                    Arc::clone(&snap.license_types),
                    Arc::clone(&snap.network_ranges),
                ));
            }
        }

        let mut guard = self.snapshot.write().await;

        // another task may have rebuilt while we waited for the lock
        let current_gen = self.generation.load(Ordering::Acquire);
        if let Some(snap) = guard.as_ref()
            && snap.generation == current_gen
        {
            return Ok((
                Arc::clone(&snap.license_types),
                Arc::clone(&snap.network_ranges),
            ));
        }

        debug!(generation = current_gen, "rebuilding policy catalog snapshot");
        let license_types = self.inner.license_types().await?;
        let network_ranges = self.inner.network_ranges().await?;

        *guard = Some(Snapshot {
            license_types: Arc::clone(&license_types),
            network_ranges: Arc::clone(&network_ranges),
            generation: current_gen,
        });
        self.cached_generation.store(current_gen, Ordering::Release);

        Ok((license_types, network_ranges))
    }
}

impl<S: PolicyStore> PolicyStore for CachedPolicyStore<S> {
    fn license_types(&self) -> impl Future<Output = Result<Arc<Vec<LicenseType>>>> + Send {
        async move { self.snapshot().await.map(|(types, _)| types) }
    }

    fn network_ranges(&self) -> impl Future<Output = Result<Arc<Vec<NetworkRange>>>> + Send {
        async move { self.snapshot().await.map(|(_, ranges)| ranges) }
    }

    fn user_by_name(&self, name: &str) -> impl Future<Output = Result<Option<User>>> + Send {
        self.inner.user_by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::AtomicUsize;
    use shelfguard_types::test_utils::TestLicenseTypeBuilder;

    /// counts loads and serves whatever catalog it currently holds.
    #[derive(Default)]
    struct CountingStore {
        loads: AtomicUsize,
        types: std::sync::Mutex<Vec<LicenseType>>,
        failing: std::sync::atomic::AtomicBool,
    }

    impl CountingStore {
        fn set_types(&self, names: &[&str]) {
            *self.types.lock().unwrap() = names
                .iter()
                .map(|n| TestLicenseTypeBuilder::new(n).build())
                .collect();
        }
    }

    impl PolicyStore for CountingStore {
        fn license_types(&self) -> impl Future<Output = Result<Arc<Vec<LicenseType>>>> + Send {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let result = if self.failing.load(Ordering::SeqCst) {
                Err(Error::PolicyStore("database is locked".to_string()))
            } else {
                Ok(Arc::new(self.types.lock().unwrap().clone()))
            };
            async move { result }
        }

        fn network_ranges(&self) -> impl Future<Output = Result<Arc<Vec<NetworkRange>>>> + Send {
            async { Ok(Arc::new(Vec::new())) }
        }

        fn user_by_name(&self, _name: &str) -> impl Future<Output = Result<Option<User>>> + Send {
            async { Ok(None) }
        }
    }

    #[tokio::test]
    async fn reads_share_one_snapshot_until_invalidated() {
        let inner = CountingStore::default();
        inner.set_types(&["restricted"]);
        let cache = CachedPolicyStore::new(inner);

        let a = cache.license_types().await.unwrap();
        let b = cache.license_types().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        cache.network_ranges().await.unwrap();
        assert_eq!(cache.inner().loads.load(Ordering::SeqCst), 1);

        cache.inner().set_types(&["restricted", "embargoed"]);
        // still the old snapshot
        assert_eq!(cache.license_types().await.unwrap().len(), 1);

        cache.invalidate();
        assert_eq!(cache.license_types().await.unwrap().len(), 2);
        assert_eq!(cache.inner().loads.load(Ordering::SeqCst), 2);
        // earlier readers keep their own snapshot
        assert_eq!(a.len(), 1);
    }

    #[tokio::test]
    async fn failed_rebuild_is_retried() {
        let inner = CountingStore::default();
        inner.failing.store(true, Ordering::SeqCst);
        let cache = CachedPolicyStore::new(inner);

        assert!(cache.license_types().await.unwrap_err().is_unavailable());

        cache.inner().failing.store(false, Ordering::SeqCst);
        cache.inner().set_types(&["restricted"]);
        assert_eq!(cache.license_types().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_readers_load_once() {
        let inner = CountingStore::default();
        inner.set_types(&["restricted"]);
        let cache = Arc::new(CachedPolicyStore::new(inner));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.license_types().await.unwrap().len()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(cache.inner().loads.load(Ordering::SeqCst), 1);
    }
}
