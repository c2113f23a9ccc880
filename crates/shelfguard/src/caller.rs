//! caller identity resolution with proxy-aware address extraction.
//!
//! the caller address decides which network ranges apply, so an
//! `X-Forwarded-For` header is only honoured when the peer is a trusted
//! proxy. otherwise any client could claim a campus address.

use std::net::IpAddr;
use std::sync::Arc;

use ipnet::IpNet;
use shelfguard_grants::{Licensee, PolicyStore, Result};
use shelfguard_types::User;
use tracing::{debug, warn};

/// the identity a request is evaluated for.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    /// the authenticated user, if any.
    pub user: Option<User>,
    /// the client address, if known.
    pub address: Option<IpAddr>,
}

impl Caller {
    /// a caller with neither user nor address.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// an anonymous caller at `address`.
    pub fn from_address(address: IpAddr) -> Self {
        Self {
            user: None,
            address: Some(address),
        }
    }

    /// the user as licensee, if authenticated.
    pub fn licensee(&self) -> Option<&dyn Licensee> {
        self.user.as_ref().map(|u| u as &dyn Licensee)
    }
}

/// resolves callers from transport metadata.
#[derive(Debug, Clone, Default)]
pub struct CallerResolver {
    /// parsed trusted proxy networks/ips
    trusted_networks: Arc<Vec<IpNet>>,
}

impl CallerResolver {
    /// create a resolver trusting the given proxy addresses.
    ///
    /// accepts ips and cidr ranges (e.g., "127.0.0.1", "10.0.0.0/8").
    /// unparseable entries are skipped with a warning.
    pub fn new(trusted_proxies: &[String]) -> Self {
        let trusted_networks: Vec<IpNet> = trusted_proxies
            .iter()
            .filter_map(|s| {
                let parsed = s
                    .parse::<IpNet>()
                    .ok()
                    .or_else(|| s.parse::<IpAddr>().ok().map(IpNet::from));
                if parsed.is_none() {
                    warn!(proxy = %s, "ignoring unparseable trusted proxy");
                }
                parsed
            })
            .collect();

        Self {
            trusted_networks: Arc::new(trusted_networks),
        }
    }

    fn is_trusted_proxy(&self, ip: IpAddr) -> bool {
        self.trusted_networks.iter().any(|net| net.contains(&ip))
    }

    /// the client address for a request from `peer`.
    ///
    /// the leftmost `X-Forwarded-For` entry wins when `peer` is trusted and
    /// the entry parses; otherwise the peer address is used.
    pub fn resolve_address(
        &self,
        peer: Option<IpAddr>,
        forwarded_for: Option<&str>,
    ) -> Option<IpAddr> {
        let peer = peer?;
        if self.is_trusted_proxy(peer)
            && let Some(forwarded) = forwarded_for
                .and_then(|h| h.split(',').next())
                .and_then(|first| first.trim().parse::<IpAddr>().ok())
        {
            return Some(forwarded);
        }
        Some(peer)
    }

    /// build the caller for an optional authenticated user name.
    ///
    /// an unknown user name resolves to an anonymous caller.
    pub async fn resolve<S: PolicyStore>(
        &self,
        store: &S,
        user_name: Option<&str>,
        peer: Option<IpAddr>,
        forwarded_for: Option<&str>,
    ) -> Result<Caller> {
        let user = match user_name {
            Some(name) => {
                let user = store.user_by_name(name).await?;
                if user.is_none() {
                    debug!(user = name, "unknown user, treating caller as anonymous");
                }
                user
            }
            None => None,
        };

        Ok(Caller {
            user,
            address: self.resolve_address(peer, forwarded_for),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfguard_grants::MemoryPolicyStore;
    use shelfguard_types::UserId;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn resolver() -> CallerResolver {
        CallerResolver::new(&[
            "127.0.0.1".to_string(),
            "10.0.0.0/8".to_string(),
            "not-an-address".to_string(),
        ])
    }

    #[test]
    fn trusted_proxy_parsing() {
        let resolver = resolver();
        assert_eq!(resolver.trusted_networks.len(), 2);
        assert!(resolver.is_trusted_proxy(ip("127.0.0.1")));
        assert!(resolver.is_trusted_proxy(ip("10.1.2.3")));
        assert!(!resolver.is_trusted_proxy(ip("192.168.1.1")));
    }

    #[test]
    fn forwarded_header_only_from_trusted_proxy() {
        let resolver = resolver();
        let header = Some("203.0.113.7, 10.0.0.2");

        assert_eq!(
            resolver.resolve_address(Some(ip("10.0.0.2")), header),
            Some(ip("203.0.113.7"))
        );
        assert_eq!(
            resolver.resolve_address(Some(ip("192.168.1.1")), header),
            Some(ip("192.168.1.1"))
        );
    }

    #[test]
    fn malformed_forwarded_header_falls_back_to_peer() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_address(Some(ip("10.0.0.2")), Some("garbage")),
            Some(ip("10.0.0.2"))
        );
        assert_eq!(resolver.resolve_address(None, Some("203.0.113.7")), None);
    }

    #[tokio::test]
    async fn resolves_known_users() {
        let store = MemoryPolicyStore::new(
            Vec::new(),
            Vec::new(),
            vec![User::new(UserId(1), "reader".to_string())],
        );
        let resolver = CallerResolver::default();

        let caller = resolver
            .resolve(&store, Some("reader"), Some(ip("198.51.100.1")), None)
            .await
            .unwrap();
        assert_eq!(caller.user.as_ref().map(|u| u.id), Some(UserId(1)));
        assert!(caller.licensee().is_some());
        assert_eq!(caller.address, Some(ip("198.51.100.1")));

        let caller = resolver
            .resolve(&store, Some("ghost"), None, None)
            .await
            .unwrap();
        assert!(caller.user.is_none());
        assert!(caller.licensee().is_none());
    }
}
