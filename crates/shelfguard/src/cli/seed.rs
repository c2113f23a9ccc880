//! the `seed` subcommand - prepare the policy database.

use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::eyre::{Context, Result};
use shelfguard_db::ShelfguardDb;
use shelfguard_grants::{PolicyDocument, PolicyStore};
use tracing::info;

use super::config::ConfigArgs;

/// seed core license types, optionally importing a policy document
#[derive(Args, Debug)]
pub struct SeedCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// json policy document to import into an empty database
    #[arg(long)]
    pub import: Option<PathBuf>,
}

impl SeedCommand {
    /// run the seed command
    pub async fn run(self) -> Result<()> {
        self.config.init_logging()?;
        let config = self.config.load()?;

        let db = ShelfguardDb::new(&config.database)
            .await
            .context("failed to open policy database")?;

        if let Some(path) = &self.import {
            import(&db, path).await?;
        }

        let created = db
            .seed_core_license_types()
            .await
            .context("failed to seed core license types")?;
        println!("Seeded {} core license type(s)", created);
        Ok(())
    }
}

async fn import(db: &ShelfguardDb, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file: {:?}", path))?;
    let store = PolicyDocument::from_json(&json)
        .and_then(PolicyDocument::into_store)
        .with_context(|| format!("invalid policy file: {:?}", path))?;

    let license_types = store.license_types().await?;
    let network_ranges = store.network_ranges().await?;
    db.import_policy(&license_types, &network_ranges, store.users())
        .await
        .context("failed to import policy")?;

    info!("Imported policy from {:?}", path);
    println!(
        "Imported {} license type(s), {} network range(s), {} user(s)",
        license_types.len(),
        network_ranges.len(),
        store.users().len()
    );
    Ok(())
}
