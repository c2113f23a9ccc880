//! the `policy` subcommand - inspect json policy documents

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail};
use shelfguard_grants::PolicyDocument;

/// inspect a policy document
#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// validate a policy file, reporting every problem
    Validate(ValidateArgs),

    /// print a policy file after parsing
    Show(ShowArgs),
}

/// validate a policy file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// path to policy file (json format)
    file: PathBuf,
}

/// print a policy file
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// path to policy file (json format)
    file: PathBuf,

    /// output format (json or yaml)
    #[arg(short, long, default_value = "json")]
    output: String,
}

impl PolicyCommand {
    /// run the policy command
    pub async fn run(self) -> Result<()> {
        match self {
            PolicyCommand::Validate(args) => validate_policy(args),
            PolicyCommand::Show(args) => show_policy(args),
        }
    }
}

fn read_policy(path: &Path) -> Result<PolicyDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file: {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("invalid JSON in policy file: {:?}", path))
}

/// every problem found in the document, one line each.
fn problems(document: &PolicyDocument) -> Vec<String> {
    document
        .problems()
        .into_iter()
        .map(|problem| problem.to_string())
        .collect()
}

fn validate_policy(args: ValidateArgs) -> Result<()> {
    let document = read_policy(&args.file)?;
    let problems = problems(&document);
    if problems.is_empty() {
        println!(
            "Policy is valid ({} license types, {} network ranges, {} users)",
            document.license_types.len(),
            document.network_ranges.len(),
            document.users.len()
        );
        return Ok(());
    }

    for problem in &problems {
        println!("{}", problem);
    }
    bail!("policy has {} problem(s)", problems.len())
}

fn show_policy(args: ShowArgs) -> Result<()> {
    let document = read_policy(&args.file)?;
    match args.output.as_str() {
        "yaml" => {
            let yaml = serde_yaml::to_string(&document).context("failed to convert to YAML")?;
            println!("{}", yaml);
        }
        "json" => println!("{}", serde_json::to_string_pretty(&document)?),
        other => bail!("unsupported output format '{}', expected json or yaml", other),
    }
    Ok(())
}
