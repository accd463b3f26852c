//! Repository-host operations the roll engine issues.
//!
//! The core never talks to the GitHub API directly; it issues the abstract
//! operation set defined by [`RepoHost`]. The octocrab-backed
//! [`OctocrabHost`] is the production implementation, and tests inject an
//! in-memory fake over the same trait.

mod api;
mod octo;

pub use api::{Branch, HostError, ManifestFile, PullRequest, PullRequestUpdate, Repo, RepoHost};
pub use octo::OctocrabHost;
