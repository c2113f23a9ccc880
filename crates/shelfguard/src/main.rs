//! shelfguard - access-control policy evaluation for digital library resources

use clap::Parser;
use color_eyre::eyre::Result;
use shelfguard::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Check(cmd) => cmd.run().await,
        Command::Seed(cmd) => cmd.run().await,
        Command::Policy(cmd) => cmd.run().await,
    }
}
