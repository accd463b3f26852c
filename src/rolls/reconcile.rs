//! Pull-request reconciliation for a single (target, base branch) unit of
//! work: create, update, or intentionally skip, leaving exactly one open
//! roll PR behind on success.

use tracing::{debug, info, warn};

use crate::config::{RollTarget, BACKPORT_BOT_PREFIX, PAUSE_LABEL};
use crate::error::RollError;
use crate::github::{Branch, HostError, PullRequestUpdate, RepoHost};
use crate::manifest;

use super::orchestrator::{PinUpdate, RollOutcome};
use super::{labels, pr_text, refs};

/// Reconcile the candidate version against the open pull requests for
/// this (target, base branch) pair.
///
/// Re-running with an unchanged candidate is a guaranteed no-op.
pub async fn reconcile(
    host: &dyn RepoHost,
    target: &RollTarget,
    base: &Branch,
    candidate: &str,
    default_branch: &str,
) -> Result<RollOutcome, RollError> {
    let repo = &target.repo;
    let prefix = target.title_prefix();

    let roll_prs: Vec<_> = host
        .list_open_pulls(repo, &base.name)
        .await?
        .into_iter()
        .filter(|pr| pr.title.starts_with(&prefix))
        .collect();

    if roll_prs.is_empty() {
        debug!(target = %target.name, base = %base.name, "no existing roll PR");
        return create_roll(host, target, base, candidate, default_branch).await;
    }

    let mut outcome = RollOutcome::Skipped("open roll PRs already current".to_string());
    for pr in &roll_prs {
        if pr.user_login.starts_with(BACKPORT_BOT_PREFIX) {
            debug!(pr = pr.number, user = %pr.user_login, "backport-automation PR, leaving alone");
            continue;
        }
        if base.name == default_branch && pr.labels.iter().any(|l| l == PAUSE_LABEL) {
            info!(pr = pr.number, "automatic updates paused, skipping roll");
            outcome = RollOutcome::Skipped(format!("updates paused on #{}", pr.number));
            continue;
        }

        // The PR branch may already be ahead of the base branch; the pin
        // is always re-extracted from the branch being written.
        let Some(pin) = update_manifest(host, target, &pr.head_ref, candidate).await? else {
            debug!(pr = pr.number, "pin unchanged, skipping PR update");
            continue;
        };

        match pr_text::original_version(&pr.body) {
            Some(original) => {
                let text = pr_text::pr_text(target, &original, candidate, &base.name);
                host.update_pull(
                    repo,
                    pr.number,
                    PullRequestUpdate {
                        title: Some(text.title),
                        body: Some(text.body),
                    },
                )
                .await?;
                let change =
                    labels::classify(target, &base.name, default_branch, &original, candidate)?;
                labels::apply_labels(host, repo, pr.number, &change).await?;
                info!(pr = pr.number, to = candidate, "updated roll PR");
            }
            None => {
                warn!(
                    pr = pr.number,
                    "no original-version marker in PR body, leaving title and body untouched"
                );
            }
        }
        outcome = RollOutcome::Updated(pin);
    }

    Ok(outcome)
}

/// Open a fresh roll: branch, manifest commit, pull request, labels.
async fn create_roll(
    host: &dyn RepoHost,
    target: &RollTarget,
    base: &Branch,
    candidate: &str,
    default_branch: &str,
) -> Result<RollOutcome, RollError> {
    let repo = &target.repo;
    let branch = target.branch_name(&base.name);

    refs::ensure_roll_branch(host, repo, &branch, &base.sha).await?;

    let Some(pin) = update_manifest(host, target, &branch, candidate).await? else {
        // Freshly branched from base, so the base already carries the
        // candidate. The ref left behind self-heals via the orphan path.
        return Ok(RollOutcome::Skipped("manifest already at candidate".to_string()));
    };

    let text = pr_text::pr_text(target, &pin.previous_version, &pin.target_version, &base.name);
    let head = format!("{}:{}", repo.owner, branch);
    let number = host
        .create_pull(repo, &base.name, &head, &text.title, &text.body)
        .await?;
    info!(pr = number, base = %base.name, to = candidate, "opened roll PR");

    let change = labels::classify(
        target,
        &base.name,
        default_branch,
        &pin.previous_version,
        &pin.target_version,
    )?;
    labels::apply_labels(host, repo, number, &change).await?;

    Ok(RollOutcome::Created(pin, number))
}

/// Read the manifest on `branch`, rewrite the pin to `candidate`, and
/// commit it back. Returns `None` when the branch is already pinned at
/// `candidate`. A write racing a concurrent change is re-read and retried
/// once before failing the branch.
async fn update_manifest(
    host: &dyn RepoHost,
    target: &RollTarget,
    branch: &str,
    candidate: &str,
) -> Result<Option<PinUpdate>, RollError> {
    let repo = &target.repo;
    let mut retried = false;

    loop {
        let file = host.read_file(repo, &target.manifest_path, branch).await?;
        let previous = manifest::extract(&file.content, &target.locator)?;
        if previous == candidate {
            return Ok(None);
        }

        let next = manifest::rewrite(&file.content, &target.locator, &previous, candidate)?;
        let message = target.commit_message(candidate);
        match host
            .write_file(repo, &target.manifest_path, &next, &file.sha, branch, &message)
            .await
        {
            Ok(()) => {
                return Ok(Some(PinUpdate {
                    previous_version: previous,
                    target_version: candidate.to_string(),
                }))
            }
            Err(HostError::PreconditionFailed(what)) if !retried => {
                warn!(branch, %what, "manifest changed concurrently, re-reading and retrying");
                retried = true;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Close every other open roll PR against `base` that `new_number`
/// supersedes, commenting with the replacement and deleting their head
/// branches.
///
/// Only used by targets that roll a single shared branch irregularly and
/// can accumulate parallel PRs; the regular per-branch flow never needs
/// this because its branch naming is the dedup key.
pub async fn supersede(
    host: &dyn RepoHost,
    target: &RollTarget,
    base: &str,
    new_number: u64,
) -> Result<(), RollError> {
    let repo = &target.repo;
    let prefix = target.title_prefix();

    for pr in host.list_open_pulls(repo, base).await? {
        if pr.number == new_number || !pr.title.starts_with(&prefix) {
            continue;
        }
        if pr.user_login.starts_with(BACKPORT_BOT_PREFIX) {
            continue;
        }
        info!(pr = pr.number, by = new_number, "closing superseded roll PR");
        host.add_comment(
            repo,
            pr.number,
            &format!("Closing - superseded by #{new_number}."),
        )
        .await?;
        host.close_pull(repo, pr.number).await?;
        host.delete_ref(repo, &format!("heads/{}", pr.head_ref)).await?;
    }
    Ok(())
}
