//! Per-target entry point: fans out over base branches, isolates
//! per-branch failures, and aggregates a single pass/fail verdict.

use serde::Serialize;
use tracing::{debug, error, info};

use crate::branches;
use crate::config::{BranchSelection, RollTarget};
use crate::error::RollError;
use crate::github::{Branch, RepoHost};
use crate::manifest;
use crate::upstream::CandidateSource;
use crate::version;

use super::reconcile;

/// The before/after of a single roll decision. `previous_version` is
/// always the value extracted inside this run, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinUpdate {
    pub previous_version: String,
    pub target_version: String,
}

/// Per-branch result of a roll attempt.
#[derive(Debug, Clone, Serialize)]
pub enum RollOutcome {
    /// Nothing to do: the gate declined, updates are paused, or the open
    /// PR is already current.
    Skipped(String),
    /// An existing roll PR was moved forward.
    Updated(PinUpdate),
    /// A new roll PR was opened.
    Created(PinUpdate, u64),
    /// This branch failed; the run continued with the next one.
    Failed(String),
}

/// Aggregated outcome of one target's run across all its base branches.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub target: String,
    pub outcomes: Vec<(String, RollOutcome)>,
}

impl RunSummary {
    /// Number of branches that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RollOutcome::Failed(_)))
            .count()
    }

    /// Collapse into the run's single pass/fail verdict.
    pub fn verdict(&self) -> Result<(), RollError> {
        let failed = self.failed();
        if failed > 0 {
            Err(RollError::RunFailed {
                failed,
                attempted: self.outcomes.len(),
            })
        } else {
            Ok(())
        }
    }
}

/// Roll one target across its configured base branches.
///
/// An upstream-lookup failure aborts immediately; any other error is
/// confined to the branch it occurred on and surfaces through
/// [`RunSummary::verdict`] after every branch was attempted.
pub async fn roll_target(
    host: &dyn RepoHost,
    target: &RollTarget,
    source: &dyn CandidateSource,
) -> Result<RunSummary, RollError> {
    let candidate = source
        .candidate(target)
        .await
        .map_err(|err| RollError::UpstreamUnavailable {
            target: target.name.clone(),
            reason: err.to_string(),
        })?;
    info!(target = %target.name, %candidate, "roll check started");

    let default = host.default_branch(&target.repo).await?;
    let bases = base_branches(host, target, &default).await?;

    let mut outcomes = Vec::with_capacity(bases.len());
    for base in &bases {
        let outcome = match roll_branch(host, target, base, &candidate, &default.name).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(target = %target.name, base = %base.name, %err, "branch roll failed");
                RollOutcome::Failed(err.to_string())
            }
        };
        outcomes.push((base.name.clone(), outcome));
    }

    Ok(RunSummary {
        target: target.name.clone(),
        outcomes,
    })
}

/// One (target, base branch) unit of work, in strict order:
/// extract, gate, reconcile.
async fn roll_branch(
    host: &dyn RepoHost,
    target: &RollTarget,
    base: &Branch,
    candidate: &str,
    default_branch: &str,
) -> Result<RollOutcome, RollError> {
    let file = host
        .read_file(&target.repo, &target.manifest_path, &base.name)
        .await?;
    let current = manifest::extract(&file.content, &target.locator)?;

    if !version::should_roll(&current, candidate, &target.policy)? {
        debug!(base = %base.name, %current, %candidate, "gate declined roll");
        return Ok(RollOutcome::Skipped(format!(
            "{current} is the most recent known in its line"
        )));
    }

    reconcile::reconcile(host, target, base, candidate, default_branch).await
}

/// The base branches this target rolls, default branch last.
async fn base_branches(
    host: &dyn RepoHost,
    target: &RollTarget,
    default: &Branch,
) -> Result<Vec<Branch>, RollError> {
    match target.branches {
        BranchSelection::Head => Ok(vec![default.clone()]),
        BranchSelection::SupportedAndHead => {
            let all = host.list_branches(&target.repo).await?;
            let names: Vec<String> = all.iter().map(|b| b.name.clone()).collect();
            let supported =
                branches::supported_release_branches(&names, branches::NUM_SUPPORTED_LINES);
            debug!(target = %target.name, ?supported, "selected release branches");

            let mut picked: Vec<Branch> = all
                .into_iter()
                .filter(|b| supported.contains(&b.name))
                .collect();
            picked.push(default.clone());
            Ok(picked)
        }
    }
}
