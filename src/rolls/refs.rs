//! Roll-branch ref lifecycle.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::github::{HostError, Repo, RepoHost};

/// Delay letting the host settle after a ref deletion before the same ref
/// path is recreated; ref visibility is eventually consistent.
const REF_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Ensure the roll branch exists at `base_sha`.
///
/// The caller has already established that no open pull request claims
/// this branch, so an existing ref here is an orphan left by a previous
/// aborted roll: it is deleted and recreated at the new base. A creation
/// conflict is retried once after a settle delay; a second conflict is
/// fatal for this branch only.
pub async fn ensure_roll_branch(
    host: &dyn RepoHost,
    repo: &Repo,
    branch: &str,
    base_sha: &str,
) -> Result<(), HostError> {
    let ref_name = format!("heads/{branch}");

    match host.get_ref(repo, &ref_name).await {
        Ok(orphan_sha) => {
            info!(branch, %orphan_sha, "deleting orphan ref from a previous roll");
            host.delete_ref(repo, &ref_name).await?;
            tokio::time::sleep(REF_SETTLE_DELAY).await;
        }
        Err(HostError::NotFound(_)) => {
            debug!(branch, "no orphan ref present");
        }
        Err(err) => return Err(err),
    }

    debug!(branch, sha = base_sha, "creating roll ref");
    match host.create_ref(repo, &ref_name, base_sha).await {
        Ok(()) => Ok(()),
        Err(HostError::RefConflict(_)) => {
            warn!(branch, "ref creation conflicted, retrying once");
            tokio::time::sleep(REF_SETTLE_DELAY).await;
            host.create_ref(repo, &ref_name, base_sha).await
        }
        Err(err) => Err(err),
    }
}
