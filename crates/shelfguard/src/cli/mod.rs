//! cli subcommands for shelfguard.
//!
//! - `shelfguard check` - evaluate one access decision
//! - `shelfguard seed` - seed core license types, optionally import a policy
//! - `shelfguard policy validate|show` - inspect a json policy document

mod check;
mod config;
mod policy;
mod seed;

pub use check::CheckCommand;
pub use config::ConfigArgs;
pub use policy::PolicyCommand;
pub use seed::SeedCommand;

use clap::{Parser, Subcommand};

/// shelfguard - access-control policy evaluation for digital library resources
#[derive(Parser, Debug)]
#[command(name = "shelfguard")]
#[command(about = "License-based access control for digital library resources", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// evaluate one access decision and print the deciding step
    Check(CheckCommand),

    /// seed core license types into the database
    Seed(SeedCommand),

    /// inspect a policy document
    #[command(subcommand)]
    Policy(PolicyCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_arguments() {
        let cli = Cli::try_parse_from([
            "shelfguard",
            "check",
            "--privilege",
            "view-images",
            "--user",
            "reader",
            "--ip",
            "203.0.113.5",
            "PPN123",
            "--file",
            "00000001.tif",
        ])
        .unwrap();

        let Command::Check(cmd) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(cmd.pi, "PPN123");
        assert_eq!(cmd.file.as_deref(), Some("00000001.tif"));
        assert_eq!(cmd.user.as_deref(), Some("reader"));
        assert_eq!(cmd.ip, Some("203.0.113.5".parse().unwrap()));
    }

    #[test]
    fn policy_requires_subcommand() {
        assert!(Cli::try_parse_from(["shelfguard", "policy"]).is_err());
        assert!(Cli::try_parse_from(["shelfguard", "policy", "validate", "p.json"]).is_ok());
    }
}
