//! crbot - CLA compliance bot
//!
//! Checks every open pull request of an organization (or one repository)
//! against a roster of CLA signers, then labels, comments on, or reviews
//! each pull request accordingly. Without `--update-repo` the intended
//! changes are only logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};

use crbot_core::{
    load_cla_signers, load_config, load_secrets, parse_pull_numbers, write_run_report_json,
    ComplianceAggregator, LogFormat, NotificationPolicy, Orchestrator, ProcessSpec, RunConfig,
    RunOptions, Secrets, TOKEN_ENV_VAR,
};
use crbot_github::{GitHubClient, DEFAULT_API_URL};

#[derive(Parser, Debug)]
#[command(name = "crbot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Enforce CLA coverage on GitHub pull requests", long_about = None)]
struct Cli {
    /// Path to secrets file (YAML or JSON with an `auth` token); defaults to $GITHUB_TOKEN
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to CLA signers file
    #[arg(long)]
    cla_signers: PathBuf,

    /// Organization or user name; required if not set in the config file
    #[arg(long)]
    org: Option<String>,

    /// Repository name; all repositories of the organization if omitted
    #[arg(long)]
    repo: Option<String>,

    /// Comma-separated list of pull requests to process
    #[arg(long)]
    pr: Option<String>,

    /// Apply labels, comments and reviews instead of only logging them
    #[arg(long)]
    update_repo: bool,

    /// Treat commits whose accounts are not in the roster as external
    #[arg(long)]
    unknown_as_external: bool,

    /// How to notify pull requests
    #[arg(long, value_enum)]
    notification: Option<NotificationArg>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum NotificationArg {
    /// Comment once when a pull request becomes non-compliant
    Comment,
    /// Approve or request changes on every run
    Review,
}

impl From<NotificationArg> for NotificationPolicy {
    fn from(arg: NotificationArg) -> Self {
        match arg {
            NotificationArg::Comment => NotificationPolicy::CommentOnChange,
            NotificationArg::Review => NotificationPolicy::ReviewEveryRun,
        }
    }
}

/// Settings after merging flags over the config file.
#[derive(Debug, PartialEq, Eq)]
struct Resolved {
    spec: ProcessSpec,
    options: RunOptions,
    unknown_as_external: bool,
}

fn resolve(cli: &Cli, config: RunConfig) -> Result<Resolved> {
    let org = match cli.org.clone().filter(|o| !o.is_empty()).or(config.org) {
        Some(org) if !org.is_empty() => org,
        _ => bail!("--org must be non-empty or `org` must be specified in the config file"),
    };
    let repo = cli
        .repo
        .clone()
        .filter(|r| !r.is_empty())
        .or(config.repo.filter(|r| !r.is_empty()));
    let pulls = match cli.pr.as_deref() {
        Some(list) => parse_pull_numbers(list).context("Invalid value for --pr")?,
        None => Vec::new(),
    };
    let notification = cli
        .notification
        .map(NotificationPolicy::from)
        .or(config.notification)
        .unwrap_or_default();
    let unknown_as_external =
        cli.unknown_as_external || config.unknown_as_external.unwrap_or(false);

    Ok(Resolved {
        spec: ProcessSpec { org, repo, pulls },
        options: RunOptions {
            update_repo: cli.update_repo,
            notification,
        },
        unknown_as_external,
    })
}

fn token(secrets: Option<&Path>) -> Result<String> {
    let secrets = match secrets {
        Some(path) => load_secrets(path)?,
        None => Secrets::from_env().with_context(|| {
            format!("--secrets is required when {TOKEN_ENV_VAR} is not set")
        })?,
    };
    Ok(secrets.auth)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    crbot_core::init_tracing(LogFormat::from_json_flag(cli.json), level);

    let token = token(cli.secrets.as_deref())?;
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };
    let roster = load_cla_signers(&cli.cla_signers)?;
    info!(
        "Loaded {} CLA signer accounts from {}",
        roster.len(),
        cli.cla_signers.display()
    );

    let resolved = resolve(&cli, config)?;

    let github = Arc::new(
        GitHubClient::with_base_url(&cli.api_url, token)
            .context("Failed to create GitHub client")?,
    );
    let aggregator =
        ComplianceAggregator::for_roster(Arc::new(roster), resolved.unknown_as_external);
    let orchestrator = Orchestrator::new(github.clone(), github, aggregator, resolved.options);

    let report = orchestrator
        .run(&resolved.spec)
        .await
        .with_context(|| format!("Failed to process {}", resolved.spec.org))?;

    if let Some(path) = &cli.report {
        write_run_report_json(path, &report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    Ok(())
}
