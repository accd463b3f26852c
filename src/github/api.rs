//! The abstract operation set and data types for a repository host.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// A repository slug (owner plus name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    #[must_use]
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Snapshot of a manifest file at a specific ref.
///
/// `sha` is the content-addressable handle the host hands out on reads;
/// it must be supplied as the precondition token on any write, which then
/// fails with [`HostError::PreconditionFailed`] if the file changed
/// concurrently.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    pub path: String,
    pub git_ref: String,
    pub content: String,
    pub sha: String,
}

/// A branch tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub sha: String,
}

/// An open pull request as surfaced by [`RepoHost::list_open_pulls`].
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub number: u64,
    pub head_ref: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub user_login: String,
}

/// Fields to change on an open pull request.
#[derive(Debug, Clone, Default)]
pub struct PullRequestUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Failures of individual host operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// The ref, file, or pull request does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The path names a directory, not a file.
    #[error("path is a directory: {0}")]
    IsDirectory(String),

    /// A write raced against a concurrent change to the same file.
    #[error("write precondition failed: {0}")]
    PreconditionFailed(String),

    /// Ref creation hit an already-existing ref.
    #[error("ref already exists: {0}")]
    RefConflict(String),

    /// Any other host API failure.
    #[error("host API error: {0}")]
    Api(String),
}

/// The operations the roll engine requires from a repository host.
///
/// Ref-taking methods use the short form `heads/<branch>`.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Read a file at a ref, returning content plus the write-precondition
    /// token.
    async fn read_file(
        &self,
        repo: &Repo,
        path: &str,
        git_ref: &str,
    ) -> Result<ManifestFile, HostError>;

    /// Commit new file content onto `branch`. `sha` is the token returned
    /// by the read this write is based on.
    async fn write_file(
        &self,
        repo: &Repo,
        path: &str,
        content: &str,
        sha: &str,
        branch: &str,
        message: &str,
    ) -> Result<(), HostError>;

    /// Resolve a ref to its commit sha.
    async fn get_ref(&self, repo: &Repo, ref_name: &str) -> Result<String, HostError>;

    async fn create_ref(&self, repo: &Repo, ref_name: &str, sha: &str) -> Result<(), HostError>;

    async fn delete_ref(&self, repo: &Repo, ref_name: &str) -> Result<(), HostError>;

    /// The repository's default branch and its current tip.
    async fn default_branch(&self, repo: &Repo) -> Result<Branch, HostError>;

    async fn get_branch(&self, repo: &Repo, name: &str) -> Result<Branch, HostError>;

    /// All protected branches.
    async fn list_branches(&self, repo: &Repo) -> Result<Vec<Branch>, HostError>;

    /// Open pull requests targeting `base`.
    async fn list_open_pulls(&self, repo: &Repo, base: &str)
        -> Result<Vec<PullRequest>, HostError>;

    /// Open a pull request and return its number.
    async fn create_pull(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<u64, HostError>;

    async fn update_pull(
        &self,
        repo: &Repo,
        number: u64,
        update: PullRequestUpdate,
    ) -> Result<(), HostError>;

    async fn close_pull(&self, repo: &Repo, number: u64) -> Result<(), HostError>;

    async fn add_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<(), HostError>;

    async fn list_labels(&self, repo: &Repo, number: u64) -> Result<Vec<String>, HostError>;

    async fn add_labels(&self, repo: &Repo, number: u64, labels: &[String])
        -> Result<(), HostError>;

    async fn remove_label(&self, repo: &Repo, number: u64, label: &str) -> Result<(), HostError>;
}
