//! read access to the policy catalog.

use std::future::Future;
use std::sync::Arc;

use shelfguard_types::{LicenseType, NetworkRange, User};

use crate::error::Result;

/// read-only policy store.
///
/// implementations report persistence failures as
/// [`Error::PolicyStore`](crate::Error::PolicyStore). administrative
/// writes are not part of this trait.
pub trait PolicyStore: Send + Sync {
    /// the full license type catalog.
    fn license_types(&self) -> impl Future<Output = Result<Arc<Vec<LicenseType>>>> + Send;

    /// every configured network range with its licenses.
    fn network_ranges(&self) -> impl Future<Output = Result<Arc<Vec<NetworkRange>>>> + Send;

    /// a user with the licenses they hold.
    fn user_by_name(&self, name: &str) -> impl Future<Output = Result<Option<User>>> + Send;
}

impl<T: PolicyStore> PolicyStore for Arc<T> {
    fn license_types(&self) -> impl Future<Output = Result<Arc<Vec<LicenseType>>>> + Send {
        (**self).license_types()
    }

    fn network_ranges(&self) -> impl Future<Output = Result<Arc<Vec<NetworkRange>>>> + Send {
        (**self).network_ranges()
    }

    fn user_by_name(&self, name: &str) -> impl Future<Output = Result<Option<User>>> + Send {
        (**self).user_by_name(name)
    }
}

/// a policy store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyStore {
    license_types: Arc<Vec<LicenseType>>,
    network_ranges: Arc<Vec<NetworkRange>>,
    users: Arc<Vec<User>>,
}

impl MemoryPolicyStore {
    /// create a store from its parts.
    pub fn new(
        license_types: Vec<LicenseType>,
        network_ranges: Vec<NetworkRange>,
        users: Vec<User>,
    ) -> Self {
        Self {
            license_types: Arc::new(license_types),
            network_ranges: Arc::new(network_ranges),
            users: Arc::new(users),
        }
    }

    /// a store with license types only.
    pub fn with_license_types(license_types: Vec<LicenseType>) -> Self {
        Self::new(license_types, Vec::new(), Vec::new())
    }

    /// look up a user by name.
    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    /// every user in the store.
    pub fn users(&self) -> &[User] {
        &self.users
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn license_types(&self) -> impl Future<Output = Result<Arc<Vec<LicenseType>>>> + Send {
        let types = Arc::clone(&self.license_types);
        async move { Ok(types) }
    }

    fn network_ranges(&self) -> impl Future<Output = Result<Arc<Vec<NetworkRange>>>> + Send {
        let ranges = Arc::clone(&self.network_ranges);
        async move { Ok(ranges) }
    }

    fn user_by_name(&self, name: &str) -> impl Future<Output = Result<Option<User>>> + Send {
        let user = self.user(name).cloned();
        async move { Ok(user) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfguard_types::UserId;
    use shelfguard_types::test_utils::TestLicenseTypeBuilder;

    #[tokio::test]
    async fn memory_store_shares_snapshots() {
        let store = MemoryPolicyStore::new(
            vec![TestLicenseTypeBuilder::new("restricted").build()],
            Vec::new(),
            vec![User::new(UserId(7), "reader".to_string())],
        );

        let a = store.license_types().await.unwrap();
        let b = store.license_types().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(store.network_ranges().await.unwrap().is_empty());

        let user = store.user_by_name("reader").await.unwrap().unwrap();
        assert_eq!(user.id, UserId(7));
        assert!(store.user_by_name("nobody").await.unwrap().is_none());
    }
}
