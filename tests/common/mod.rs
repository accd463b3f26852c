//! In-memory repository host used by the flow tests.
//!
//! Models the only persistent store the roller has: refs, files, pull
//! requests, and labels, with a precondition-checked file write. Mutation
//! counters let tests assert that a re-run performs zero writes.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use roller::github::{
    Branch, HostError, ManifestFile, PullRequest, PullRequestUpdate, Repo, RepoHost,
};

#[derive(Debug, Clone)]
pub struct FakePull {
    pub number: u64,
    pub base: String,
    pub head_ref: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub user_login: String,
    pub open: bool,
    pub comments: Vec<String>,
}

#[derive(Debug, Default)]
struct Counters {
    file_writes: usize,
    ref_writes: usize,
    pull_writes: usize,
    label_writes: usize,
}

#[derive(Debug, Default)]
struct State {
    // Commit sha -> full tree snapshot.
    commits: HashMap<String, HashMap<String, String>>,
    // "heads/<branch>" -> commit sha.
    refs: HashMap<String, String>,
    protected: Vec<String>,
    default_branch: String,
    pulls: Vec<FakePull>,
    next_pull: u64,
    next_commit: u64,
    counters: Counters,
}

pub struct FakeHost {
    state: Mutex<State>,
    fail_next_write: AtomicBool,
}

impl FakeHost {
    pub fn new(default_branch: &str) -> Self {
        Self {
            state: Mutex::new(State {
                default_branch: default_branch.to_string(),
                next_pull: 1,
                ..State::default()
            }),
            fail_next_write: AtomicBool::new(false),
        }
    }

    /// Seed a branch with a tree of files.
    pub fn add_branch(&self, name: &str, protected: bool, files: &[(&str, &str)]) {
        let mut state = self.state.lock().unwrap();
        let tree: HashMap<String, String> = files
            .iter()
            .map(|(path, content)| ((*path).to_string(), (*content).to_string()))
            .collect();
        let sha = format!("commit-{}", state.next_commit);
        state.next_commit += 1;
        state.commits.insert(sha.clone(), tree);
        state.refs.insert(format!("heads/{name}"), sha);
        if protected {
            state.protected.push(name.to_string());
        }
    }

    /// Seed an open pull request.
    pub fn add_pull(
        &self,
        base: &str,
        head_ref: &str,
        title: &str,
        body: &str,
        labels: &[&str],
        user_login: &str,
    ) -> u64 {
        let mut state = self.state.lock().unwrap();
        let number = state.next_pull;
        state.next_pull += 1;
        state.pulls.push(FakePull {
            number,
            base: base.to_string(),
            head_ref: head_ref.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            user_login: user_login.to_string(),
            open: true,
            comments: Vec::new(),
        });
        number
    }

    /// The next file write fails its precondition once.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn open_pulls(&self, base: &str) -> Vec<FakePull> {
        let state = self.state.lock().unwrap();
        state
            .pulls
            .iter()
            .filter(|pr| pr.open && pr.base == base)
            .cloned()
            .collect()
    }

    pub fn pull(&self, number: u64) -> FakePull {
        let state = self.state.lock().unwrap();
        state
            .pulls
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .expect("no such pull request")
    }

    pub fn file_at(&self, branch: &str, path: &str) -> String {
        let state = self.state.lock().unwrap();
        let sha = state.refs.get(&format!("heads/{branch}")).expect("no such branch");
        state.commits[sha][path].clone()
    }

    pub fn ref_sha(&self, branch: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.refs.get(&format!("heads/{branch}")).cloned()
    }

    pub fn mutation_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        let c = &state.counters;
        c.file_writes + c.ref_writes + c.pull_writes + c.label_writes
    }

    pub fn reset_counters(&self) {
        let mut state = self.state.lock().unwrap();
        state.counters = Counters::default();
    }
}

fn file_token(path: &str, content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[async_trait]
impl RepoHost for FakeHost {
    async fn read_file(
        &self,
        _repo: &Repo,
        path: &str,
        git_ref: &str,
    ) -> Result<ManifestFile, HostError> {
        let state = self.state.lock().unwrap();
        let sha = state
            .refs
            .get(&format!("heads/{git_ref}"))
            .ok_or_else(|| HostError::NotFound(git_ref.to_string()))?;
        let content = state.commits[sha]
            .get(path)
            .ok_or_else(|| HostError::NotFound(path.to_string()))?
            .clone();
        Ok(ManifestFile {
            path: path.to_string(),
            git_ref: git_ref.to_string(),
            sha: file_token(path, &content),
            content,
        })
    }

    async fn write_file(
        &self,
        _repo: &Repo,
        path: &str,
        content: &str,
        sha: &str,
        branch: &str,
        _message: &str,
    ) -> Result<(), HostError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(HostError::PreconditionFailed(path.to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let ref_name = format!("heads/{branch}");
        let commit_sha = state
            .refs
            .get(&ref_name)
            .ok_or_else(|| HostError::NotFound(branch.to_string()))?
            .clone();
        let current = state.commits[&commit_sha]
            .get(path)
            .ok_or_else(|| HostError::NotFound(path.to_string()))?;
        if file_token(path, current) != sha {
            return Err(HostError::PreconditionFailed(path.to_string()));
        }

        let mut tree = state.commits[&commit_sha].clone();
        tree.insert(path.to_string(), content.to_string());
        let new_sha = format!("commit-{}", state.next_commit);
        state.next_commit += 1;
        state.commits.insert(new_sha.clone(), tree);
        state.refs.insert(ref_name, new_sha);
        state.counters.file_writes += 1;
        Ok(())
    }

    async fn get_ref(&self, _repo: &Repo, ref_name: &str) -> Result<String, HostError> {
        let state = self.state.lock().unwrap();
        state
            .refs
            .get(ref_name)
            .cloned()
            .ok_or_else(|| HostError::NotFound(ref_name.to_string()))
    }

    async fn create_ref(&self, _repo: &Repo, ref_name: &str, sha: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        if state.refs.contains_key(ref_name) {
            return Err(HostError::RefConflict(ref_name.to_string()));
        }
        if !state.commits.contains_key(sha) {
            return Err(HostError::NotFound(sha.to_string()));
        }
        state.refs.insert(ref_name.to_string(), sha.to_string());
        state.counters.ref_writes += 1;
        Ok(())
    }

    async fn delete_ref(&self, _repo: &Repo, ref_name: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        state
            .refs
            .remove(ref_name)
            .ok_or_else(|| HostError::NotFound(ref_name.to_string()))?;
        state.counters.ref_writes += 1;
        Ok(())
    }

    async fn default_branch(&self, repo: &Repo) -> Result<Branch, HostError> {
        let name = self.state.lock().unwrap().default_branch.clone();
        self.get_branch(repo, &name).await
    }

    async fn get_branch(&self, _repo: &Repo, name: &str) -> Result<Branch, HostError> {
        let state = self.state.lock().unwrap();
        let sha = state
            .refs
            .get(&format!("heads/{name}"))
            .ok_or_else(|| HostError::NotFound(name.to_string()))?;
        Ok(Branch {
            name: name.to_string(),
            sha: sha.clone(),
        })
    }

    async fn list_branches(&self, _repo: &Repo) -> Result<Vec<Branch>, HostError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .protected
            .iter()
            .filter_map(|name| {
                state.refs.get(&format!("heads/{name}")).map(|sha| Branch {
                    name: name.clone(),
                    sha: sha.clone(),
                })
            })
            .collect())
    }

    async fn list_open_pulls(
        &self,
        _repo: &Repo,
        base: &str,
    ) -> Result<Vec<PullRequest>, HostError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pulls
            .iter()
            .filter(|pr| pr.open && pr.base == base)
            .map(|pr| PullRequest {
                number: pr.number,
                head_ref: pr.head_ref.clone(),
                title: pr.title.clone(),
                body: pr.body.clone(),
                labels: pr.labels.clone(),
                user_login: pr.user_login.clone(),
            })
            .collect())
    }

    async fn create_pull(
        &self,
        _repo: &Repo,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<u64, HostError> {
        let mut state = self.state.lock().unwrap();
        let number = state.next_pull;
        state.next_pull += 1;
        // `owner:branch` head form, as sent to the real host.
        let head_ref = head.split(':').next_back().unwrap_or(head).to_string();
        state.pulls.push(FakePull {
            number,
            base: base.to_string(),
            head_ref,
            title: title.to_string(),
            body: body.to_string(),
            labels: Vec::new(),
            user_login: "roller[bot]".to_string(),
            open: true,
            comments: Vec::new(),
        });
        state.counters.pull_writes += 1;
        Ok(number)
    }

    async fn update_pull(
        &self,
        _repo: &Repo,
        number: u64,
        update: PullRequestUpdate,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let pr = state
            .pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| HostError::NotFound(format!("#{number}")))?;
        if let Some(title) = update.title {
            pr.title = title;
        }
        if let Some(body) = update.body {
            pr.body = body;
        }
        state.counters.pull_writes += 1;
        Ok(())
    }

    async fn close_pull(&self, _repo: &Repo, number: u64) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let pr = state
            .pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| HostError::NotFound(format!("#{number}")))?;
        pr.open = false;
        state.counters.pull_writes += 1;
        Ok(())
    }

    async fn add_comment(&self, _repo: &Repo, number: u64, body: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let pr = state
            .pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| HostError::NotFound(format!("#{number}")))?;
        pr.comments.push(body.to_string());
        Ok(())
    }

    async fn list_labels(&self, _repo: &Repo, number: u64) -> Result<Vec<String>, HostError> {
        let state = self.state.lock().unwrap();
        let pr = state
            .pulls
            .iter()
            .find(|pr| pr.number == number)
            .ok_or_else(|| HostError::NotFound(format!("#{number}")))?;
        Ok(pr.labels.clone())
    }

    async fn add_labels(
        &self,
        _repo: &Repo,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let pr = state
            .pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| HostError::NotFound(format!("#{number}")))?;
        for label in labels {
            if !pr.labels.contains(label) {
                pr.labels.push(label.clone());
            }
        }
        state.counters.label_writes += 1;
        Ok(())
    }

    async fn remove_label(&self, _repo: &Repo, number: u64, label: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let pr = state
            .pulls
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| HostError::NotFound(format!("#{number}")))?;
        pr.labels.retain(|l| l != label);
        state.counters.label_writes += 1;
        Ok(())
    }
}
