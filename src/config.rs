//! Static roll-target configuration.
//!
//! Targets are data: each carries its manifest location, pin locator,
//! comparison policy, and PR-text style. Adding a target is a new entry
//! here, not a new branch in a dispatch function.

use crate::github::Repo;
use crate::manifest::ManifestLocator;
use crate::version::RollPolicy;

/// Label that pauses automatic updates of an open roll pull request.
pub const PAUSE_LABEL: &str = "roller/pause";

/// Label applied to default-branch rolls, which never need backporting.
pub const NO_BACKPORT_LABEL: &str = "no-backport";

/// Label applied to release-branch rolls so the backport check stands down.
pub const BACKPORT_CHECK_SKIP_LABEL: &str = "backport-check-skip";

pub const SEMVER_PATCH_LABEL: &str = "semver/patch";
pub const SEMVER_MINOR_LABEL: &str = "semver/minor";

/// Author-login prefix of the backport automation. Its pull requests are
/// never touched by the roller.
pub const BACKPORT_BOT_PREFIX: &str = "trop";

/// How a pull-request body links the upstream change range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLinkStyle {
    /// A gitiles `+log/<prev>..<new>` range under the given base URL.
    Gitiles { base: String },
    /// A GitHub `compare/<prev>...<new>` range for the given `owner/repo`.
    Compare { repo: String },
    /// No public change log to link.
    None,
}

/// Which base branches a target rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSelection {
    /// The default branch only.
    Head,
    /// Supported release branches plus the default branch.
    SupportedAndHead,
}

/// A kind of pin this roller keeps up to date.
#[derive(Debug, Clone)]
pub struct RollTarget {
    /// Short name used in branch names, titles, and commit messages.
    pub name: String,
    /// Repository whose manifest carries the pin.
    pub repo: Repo,
    /// Path of the manifest file within the repository.
    pub manifest_path: String,
    pub locator: ManifestLocator,
    pub policy: RollPolicy,
    pub diff_link: DiffLinkStyle,
    pub branches: BranchSelection,
    /// Conventional-commit prefix for commit messages and titles.
    pub commit_prefix: String,
}

impl RollTarget {
    /// Title prefix identifying this target's roll pull requests; the
    /// primary lookup key, since numbers are unknown before creation.
    #[must_use]
    pub fn title_prefix(&self) -> String {
        format!("{}: bump {}", self.commit_prefix, self.name)
    }

    /// Roll-branch name for a base branch; stable across runs so an
    /// earlier aborted roll can be rediscovered.
    #[must_use]
    pub fn branch_name(&self, base: &str) -> String {
        format!("roller/{}/{}", self.name, base)
    }

    /// Commit message for a manifest write.
    #[must_use]
    pub fn commit_message(&self, version: &str) -> String {
        format!(
            "{}: bump {} in {} to {}",
            self.commit_prefix, self.name, self.manifest_path, version
        )
    }
}

/// Locator for the `'<key>':\n    '<value>',` quoted-key block form.
fn quoted_key(key: &str) -> ManifestLocator {
    ManifestLocator::numeric_text(&format!(r"'{key}':\n\s+'([^']+)',"))
}

/// The browser-engine pin: rolled on every supported release branch and
/// the default branch, ordered by dotted numeric compare.
#[must_use]
pub fn chromium(repo: Repo) -> RollTarget {
    RollTarget {
        name: "chromium".to_string(),
        repo,
        manifest_path: "DEPS".to_string(),
        locator: quoted_key("chromium_version"),
        policy: RollPolicy::dotted(),
        diff_link: DiffLinkStyle::Gitiles {
            base: "https://chromium.googlesource.com/chromium/src".to_string(),
        },
        branches: BranchSelection::SupportedAndHead,
        commit_prefix: "chore".to_string(),
    }
}

/// The runtime pin: default branch only, LTS (even-major) lines.
#[must_use]
pub fn node(repo: Repo) -> RollTarget {
    RollTarget {
        name: "node".to_string(),
        repo,
        manifest_path: "DEPS".to_string(),
        locator: quoted_key("node_version"),
        policy: RollPolicy::lts_only(),
        diff_link: DiffLinkStyle::Compare {
            repo: "nodejs/node".to_string(),
        },
        branches: BranchSelection::Head,
        commit_prefix: "chore".to_string(),
    }
}

/// The CI orb reference inside the CircleCI config.
#[must_use]
pub fn node_orb(repo: Repo) -> RollTarget {
    RollTarget {
        name: "node-orb".to_string(),
        repo,
        manifest_path: ".circleci/config.yml".to_string(),
        locator: ManifestLocator::key_path(&["orbs", "node"], "electron/node-orb"),
        policy: RollPolicy::semver(),
        diff_link: DiffLinkStyle::Compare {
            repo: "electron/node-orb".to_string(),
        },
        branches: BranchSelection::Head,
        commit_prefix: "chore".to_string(),
    }
}

/// The actions-runner version in the infra Dockerfile `ARG` line.
#[must_use]
pub fn actions_runner(repo: Repo) -> RollTarget {
    RollTarget {
        name: "actions-runner".to_string(),
        repo,
        manifest_path: "docker/windows-actions-runner/Dockerfile".to_string(),
        locator: ManifestLocator::numeric_text(r"(?m)^ARG RUNNER_VERSION=(\S+)$"),
        policy: RollPolicy::semver(),
        diff_link: DiffLinkStyle::Compare {
            repo: "actions/runner".to_string(),
        },
        branches: BranchSelection::Head,
        commit_prefix: "build".to_string(),
    }
}

/// The templated windows runner image reference; the pin is the whole
/// `<tag>@sha256:<digest>` pair, which has no ordering.
#[must_use]
pub fn windows_image(repo: Repo) -> RollTarget {
    RollTarget {
        name: "windows-image".to_string(),
        repo,
        manifest_path: "k8s/arc-runners/prod.yaml".to_string(),
        locator: ManifestLocator::text(
            r"win-actions-runner:(main-[0-9a-f]+@sha256:[0-9a-f]{64})",
        ),
        policy: RollPolicy::changed(),
        diff_link: DiffLinkStyle::None,
        branches: BranchSelection::Head,
        commit_prefix: "build".to_string(),
    }
}
