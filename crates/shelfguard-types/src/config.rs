//! configuration types for shelfguard

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// main configuration for shelfguard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// policy database configuration.
    pub database: DatabaseConfig,

    /// index (solr) configuration.
    pub index: IndexConfig,

    /// access evaluation switches.
    pub access: AccessConfig,

    /// session cache configuration.
    pub session: SessionConfig,
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/shelfguard/policy.sqlite".to_string(),
        }
    }
}

/// index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// base url of the solr core, e.g. `http://localhost:8983/solr/collection1`.
    pub solr_url: String,

    /// request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            solr_url: "http://localhost:8983/solr/collection1".to_string(),
            timeout_secs: 10,
        }
    }
}

/// access evaluation switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// grant everything to callers on a loopback address.
    pub full_access_for_localhost: bool,

    /// proxies whose `X-Forwarded-For` header is trusted (ips or cidrs).
    pub trusted_proxies: Vec<String>,
}

/// session cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// sessions idle for longer than this are evicted.
    pub max_idle_secs: u64,
}

impl SessionConfig {
    /// the idle limit as a duration.
    pub fn max_idle(&self) -> Duration {
        Duration::from_secs(self.max_idle_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_idle_secs: 30 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fail_safe() {
        let config = Config::default();
        assert!(!config.access.full_access_for_localhost);
        assert!(config.access.trusted_proxies.is_empty());
        assert_eq!(config.database.db_type, "sqlite");
        assert_eq!(config.session.max_idle_secs, 1800);
        assert_eq!(config.session.max_idle(), Duration::from_secs(1800));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[access]
full_access_for_localhost = true

[index]
solr_url = "http://solr:8983/solr/viewer"
"#,
        )
        .unwrap();

        assert!(config.access.full_access_for_localhost);
        assert_eq!(config.index.solr_url, "http://solr:8983/solr/viewer");
        assert_eq!(config.index.timeout_secs, 10);
        assert_eq!(
            config.database.connection_string,
            "/var/lib/shelfguard/policy.sqlite"
        );
    }
}
