//! Roller CLI - scheduled dependency pin rolls.
//!
//! One invocation rolls one target; scheduled jobs run targets as
//! separate processes, which is the system's cross-target parallelism.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use roller::config;
use roller::github::{OctocrabHost, Repo};
use roller::rolls::{roll_target, RollOutcome};
use roller::upstream::FixedCandidate;

/// Keeps pinned upstream versions in repository manifests up to date.
#[derive(Parser)]
#[command(name = "roller")]
#[command(about = "Rolls pinned dependency versions via pull requests")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository carrying the manifests (owner/repo)
    #[arg(long, global = true, default_value = "")]
    repo: String,

    /// Token used for all repository-host operations
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll the chromium pin across supported release branches and main
    Chromium {
        /// Candidate upstream version
        #[arg(long)]
        candidate: String,
    },

    /// Roll the node pin on the default branch (LTS lines only)
    Node {
        /// Candidate upstream version
        #[arg(long)]
        candidate: String,

        /// Admit an additional major line entering its support window
        #[arg(long)]
        allow_major: Option<u64>,
    },

    /// Roll the node orb reference in the CircleCI config
    NodeOrb {
        /// Candidate orb version
        #[arg(long)]
        candidate: String,
    },

    /// Roll the actions-runner version in the infra Dockerfile
    ActionsRunner {
        /// Candidate runner version
        #[arg(long)]
        candidate: String,
    },

    /// Roll the templated windows runner image tag/digest pair
    WindowsImage {
        /// Candidate image reference (tag@digest)
        #[arg(long)]
        candidate: String,
    },
}

fn parse_repo(value: &str) -> Result<Repo> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        Ok(Repo::new(parts[0], parts[1]))
    } else {
        bail!("invalid repository '{value}', expected owner/repo");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "roller=debug" } else { "roller=info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let repo = parse_repo(&cli.repo).context("--repo is required")?;
    let host = OctocrabHost::new(&cli.token)?;

    let (target, candidate) = match cli.command {
        Commands::Chromium { candidate } => (config::chromium(repo), candidate),
        Commands::Node {
            candidate,
            allow_major,
        } => {
            let mut target = config::node(repo);
            if let Some(major) = allow_major {
                target.policy = target.policy.with_extra_major(major);
            }
            (target, candidate)
        }
        Commands::NodeOrb { candidate } => (config::node_orb(repo), candidate),
        Commands::ActionsRunner { candidate } => (config::actions_runner(repo), candidate),
        Commands::WindowsImage { candidate } => (config::windows_image(repo), candidate),
    };

    let summary = roll_target(&host, &target, &FixedCandidate(candidate)).await?;
    for (branch, outcome) in &summary.outcomes {
        match outcome {
            RollOutcome::Skipped(reason) => {
                tracing::info!(branch = %branch, reason = %reason, "skipped");
            }
            RollOutcome::Updated(pin) => {
                tracing::info!(
                    branch = %branch,
                    from = %pin.previous_version,
                    to = %pin.target_version,
                    "updated existing roll PR"
                );
            }
            RollOutcome::Created(pin, number) => {
                tracing::info!(
                    branch = %branch,
                    pr = number,
                    from = %pin.previous_version,
                    to = %pin.target_version,
                    "opened roll PR"
                );
            }
            RollOutcome::Failed(reason) => {
                tracing::error!(branch = %branch, reason = %reason, "failed");
            }
        }
    }

    tracing::info!(
        "roll run completed: {}",
        serde_json::json!({
            "target": summary.target,
            "branches": summary.outcomes.len(),
            "failed": summary.failed(),
        })
    );

    summary
        .verdict()
        .context("one or more branch rolls failed")?;
    Ok(())
}
