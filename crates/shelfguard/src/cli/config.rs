//! configuration loading shared by every subcommand.

use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::eyre::{Context, Result, bail};
use shelfguard_types::{Config, DatabaseConfig};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

/// default config file search paths (in order of priority).
const CONFIG_SEARCH_PATHS: &[&str] = &["/etc/shelfguard/config.toml", "./config.toml"];

/// configuration sources: a toml file plus cli/env overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// path to config file (toml format)
    #[arg(short, long, env = "SHELFGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// database url (sqlite:// or postgres://)
    #[arg(long, env = "SHELFGUARD_DATABASE_URL")]
    pub database_url: Option<String>,

    /// base url of the solr core
    #[arg(long, env = "SHELFGUARD_SOLR_URL")]
    pub solr_url: Option<String>,

    /// solr request timeout in seconds
    #[arg(long, env = "SHELFGUARD_SOLR_TIMEOUT_SECS")]
    pub solr_timeout_secs: Option<u64>,

    /// grant everything to loopback callers
    #[arg(long, env = "SHELFGUARD_FULL_ACCESS_FOR_LOCALHOST")]
    pub full_access_for_localhost: Option<bool>,

    /// log level
    #[arg(long, env = "SHELFGUARD_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl ConfigArgs {
    /// install the global tracing subscriber.
    pub fn init_logging(&self) -> Result<()> {
        let log_level = match self
            .log_level
            .as_deref()
            .unwrap_or("info")
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(())
    }

    /// find and load config file, returning none if no config file is found.
    fn load_config_file(config_path: Option<&Path>) -> Result<Option<Config>> {
        // if explicit path provided, it must exist
        if let Some(path) = config_path {
            return read_config(path).map(Some);
        }

        for path_str in CONFIG_SEARCH_PATHS {
            let path = Path::new(path_str);
            if path.exists() {
                debug!("Found config file at {:?}", path);
                return read_config(path).map(Some);
            }
        }

        Ok(None)
    }

    /// build the effective configuration.
    ///
    /// priority order: defaults -> config file -> cli flags / env
    pub fn load(&self) -> Result<Config> {
        let mut config = match Self::load_config_file(self.config.as_deref())? {
            Some(file_config) => {
                info!("Loaded configuration from file");
                file_config
            }
            None => {
                debug!("No config file found, using defaults");
                Config::default()
            }
        };

        if let Some(db_url) = &self.database_url {
            config.database = parse_database_url(db_url)?;
        }
        if let Some(solr_url) = &self.solr_url {
            config.index.solr_url = solr_url.clone();
        }
        if let Some(timeout) = self.solr_timeout_secs {
            config.index.timeout_secs = timeout;
        }
        if let Some(localhost) = self.full_access_for_localhost {
            config.access.full_access_for_localhost = localhost;
        }

        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config file: {:?}", path))
}

/// parse a database url into a [`DatabaseConfig`].
fn parse_database_url(db_url: &str) -> Result<DatabaseConfig> {
    let parsed =
        url::Url::parse(db_url).with_context(|| format!("invalid database URL: {}", db_url))?;

    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(DatabaseConfig {
            db_type: "postgres".to_string(),
            connection_string: db_url.to_string(),
        }),
        "sqlite" => Ok(DatabaseConfig {
            db_type: "sqlite".to_string(),
            connection_string: parsed.path().to_string(),
        }),
        scheme => bail!(
            "unsupported database scheme '{}', expected 'sqlite' or 'postgres'",
            scheme
        ),
    }
}
