//! the `check` subcommand - evaluate one access decision.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{Context, Result, bail};
use shelfguard_db::ShelfguardDb;
use shelfguard_grants::{
    AccessEngine, CachedPolicyStore, Decision, EngineOptions, PolicyDocument, PolicyStore,
};
use shelfguard_state::MemorySessionStore;
use shelfguard_types::{Config, Privilege};
use tracing::{info, warn};

use super::config::ConfigArgs;
use crate::caller::CallerResolver;
use crate::service::AccessService;
use crate::solr::SolrIndex;

/// evaluate one access decision against the configured solr core
#[derive(Args, Debug)]
pub struct CheckCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// read the policy from a json document instead of the database
    #[arg(long, env = "SHELFGUARD_POLICY_FILE")]
    pub policy_file: Option<PathBuf>,

    /// privilege to check (e.g. view-images)
    #[arg(short, long)]
    pub privilege: String,

    /// name of the authenticated user
    #[arg(short, long)]
    pub user: Option<String>,

    /// address of the peer the request came from
    #[arg(long)]
    pub ip: Option<IpAddr>,

    /// value of the request's X-Forwarded-For header
    #[arg(long)]
    pub forwarded_for: Option<String>,

    /// persistent identifier of the record
    pub pi: String,

    /// file of the record; checks the whole record if omitted
    #[arg(long)]
    pub file: Option<String>,
}

impl CheckCommand {
    /// run the check command
    pub async fn run(self) -> Result<()> {
        self.config.init_logging()?;
        let config = self.config.load()?;

        let decision = match &self.policy_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read policy file: {:?}", path))?;
                let store = PolicyDocument::from_json(&json)
                    .and_then(PolicyDocument::into_store)
                    .with_context(|| format!("invalid policy file: {:?}", path))?;
                info!("Evaluating against policy file {:?}", path);
                self.evaluate(store, &config).await?
            }
            None => {
                let db = ShelfguardDb::new(&config.database)
                    .await
                    .context("failed to open policy database")?;
                self.evaluate(CachedPolicyStore::new(db), &config).await?
            }
        };

        println!("{}", decision);
        Ok(())
    }

    async fn evaluate<S: PolicyStore>(&self, store: S, config: &Config) -> Result<Decision> {
        if self.pi.trim().is_empty() {
            bail!("record identifier must not be blank");
        }
        if self.file.as_deref().is_some_and(|f| f.trim().is_empty()) {
            bail!("file name must not be blank");
        }

        let privilege = Privilege::new(self.privilege.clone());
        if !privilege.is_known() {
            warn!(%privilege, "checking a privilege outside the built-in catalog");
        }

        let caller = CallerResolver::new(&config.access.trusted_proxies)
            .resolve(
                &store,
                self.user.as_deref(),
                self.ip,
                self.forwarded_for.as_deref(),
            )
            .await?;
        if let Some(name) = &self.user
            && caller.user.is_none()
        {
            bail!("unknown user: {}", name);
        }

        let index = SolrIndex::new(&config.index)?;
        let engine = AccessEngine::new(store, index, EngineOptions::from(&config.access));
        let sessions = MemorySessionStore::with_max_idle(config.session.max_idle());
        let service = AccessService::new(engine, sessions);

        let decision = match &self.file {
            Some(file) => {
                service
                    .file_decision(&caller, &self.pi, file, &privilege)
                    .await?
            }
            None => service.record_decision(&caller, &self.pi, &privilege).await?,
        };
        Ok(decision)
    }
}
