//! Semver and backport label classification for roll pull requests.

use tracing::debug;

use crate::config::{
    RollTarget, BACKPORT_CHECK_SKIP_LABEL, NO_BACKPORT_LABEL, SEMVER_MINOR_LABEL,
    SEMVER_PATCH_LABEL,
};
use crate::github::{HostError, Repo, RepoHost};
use crate::version::{bump_kind, Bump, Scheme, VersionError};

/// Labels to add and remove to bring a roll PR's classification current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelChange {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// Classify a roll for labeling purposes.
///
/// Default-branch rolls, and targets whose every change is patch-level by
/// construction, are `semver/patch` unconditionally. Release-branch rolls
/// of semver targets compute the bump between the recorded previous
/// version and the new one; the stale alternate label from an earlier,
/// smaller bump is removed rather than accumulated.
pub fn classify(
    target: &RollTarget,
    base: &str,
    default_branch: &str,
    previous: &str,
    new_version: &str,
) -> Result<LabelChange, VersionError> {
    let head = base == default_branch;
    let mut change = LabelChange::default();
    change.add.push(
        if head {
            NO_BACKPORT_LABEL
        } else {
            BACKPORT_CHECK_SKIP_LABEL
        }
        .to_string(),
    );

    if head || target.policy.scheme != Scheme::Semver {
        change.add.push(SEMVER_PATCH_LABEL.to_string());
        return Ok(change);
    }

    match bump_kind(previous, new_version)? {
        Bump::Patch => {
            change.add.push(SEMVER_PATCH_LABEL.to_string());
            change.remove.push(SEMVER_MINOR_LABEL.to_string());
        }
        Bump::Minor | Bump::Major => {
            change.add.push(SEMVER_MINOR_LABEL.to_string());
            change.remove.push(SEMVER_PATCH_LABEL.to_string());
        }
    }
    Ok(change)
}

/// Apply a label change, skipping writes the PR already reflects to avoid
/// redundant calls and notification noise.
pub async fn apply_labels(
    host: &dyn RepoHost,
    repo: &Repo,
    number: u64,
    change: &LabelChange,
) -> Result<(), HostError> {
    let current = host.list_labels(repo, number).await?;

    let to_add: Vec<String> = change
        .add
        .iter()
        .filter(|label| !current.contains(label))
        .cloned()
        .collect();
    if !to_add.is_empty() {
        host.add_labels(repo, number, &to_add).await?;
    }

    for label in &change.remove {
        if current.contains(label) {
            host.remove_label(repo, number, label).await?;
        } else {
            debug!(pr = number, label = %label, "label already absent");
        }
    }
    Ok(())
}
