//! octocrab-backed implementation of the repository-host operations.

use anyhow::Context;
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use octocrab::models::repos::Object;
use octocrab::params::repos::Reference;
use octocrab::Octocrab;

use super::api::{
    Branch, HostError, ManifestFile, PullRequest, PullRequestUpdate, Repo, RepoHost,
};

/// Repository host backed by the GitHub REST API.
pub struct OctocrabHost {
    client: Octocrab,
}

impl OctocrabHost {
    /// Build an authenticated client from a personal access token.
    pub fn new(token: &str) -> anyhow::Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }
}

/// Map an octocrab error onto the host taxonomy by status code.
fn map_api_err(err: octocrab::Error, what: &str) -> HostError {
    if let octocrab::Error::GitHub { ref source, .. } = err {
        match source.status_code.as_u16() {
            404 => return HostError::NotFound(what.to_string()),
            409 => return HostError::PreconditionFailed(what.to_string()),
            422 => return HostError::RefConflict(what.to_string()),
            _ => {}
        }
    }
    HostError::Api(format!("{what}: {err}"))
}

/// Refs travel as `heads/<branch>`; octocrab wants the bare branch name.
fn branch_of(ref_name: &str) -> &str {
    ref_name.strip_prefix("heads/").unwrap_or(ref_name)
}

#[async_trait]
impl RepoHost for OctocrabHost {
    async fn read_file(
        &self,
        repo: &Repo,
        path: &str,
        git_ref: &str,
    ) -> Result<ManifestFile, HostError> {
        let what = format!("{repo}/{path}@{git_ref}");
        let mut listing = self
            .client
            .repos(&repo.owner, &repo.name)
            .get_content()
            .path(path)
            .r#ref(git_ref)
            .send()
            .await
            .map_err(|e| map_api_err(e, &what))?;

        let items = listing.take_items();
        if items.len() > 1 {
            return Err(HostError::IsDirectory(what));
        }
        let item = items
            .into_iter()
            .next()
            .ok_or_else(|| HostError::NotFound(what.clone()))?;
        if item.r#type != "file" {
            return Err(HostError::IsDirectory(what));
        }

        let encoded: String = item
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| HostError::Api(format!("decoding {what}: {e}")))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| HostError::Api(format!("decoding {what}: {e}")))?;

        Ok(ManifestFile {
            path: path.to_string(),
            git_ref: git_ref.to_string(),
            content,
            sha: item.sha,
        })
    }

    async fn write_file(
        &self,
        repo: &Repo,
        path: &str,
        content: &str,
        sha: &str,
        branch: &str,
        message: &str,
    ) -> Result<(), HostError> {
        self.client
            .repos(&repo.owner, &repo.name)
            .update_file(path, message, content, sha)
            .branch(branch)
            .send()
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}/{path}@{branch}")))?;
        Ok(())
    }

    async fn get_ref(&self, repo: &Repo, ref_name: &str) -> Result<String, HostError> {
        let what = format!("{repo}#{ref_name}");
        let reference = self
            .client
            .repos(&repo.owner, &repo.name)
            .get_ref(&Reference::Branch(branch_of(ref_name).to_string()))
            .await
            .map_err(|e| map_api_err(e, &what))?;

        match reference.object {
            Object::Commit { sha, .. } | Object::Tag { sha, .. } => Ok(sha),
            _ => Err(HostError::Api(format!("{what}: unexpected ref object"))),
        }
    }

    async fn create_ref(&self, repo: &Repo, ref_name: &str, sha: &str) -> Result<(), HostError> {
        self.client
            .repos(&repo.owner, &repo.name)
            .create_ref(&Reference::Branch(branch_of(ref_name).to_string()), sha)
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{ref_name}")))?;
        Ok(())
    }

    async fn delete_ref(&self, repo: &Repo, ref_name: &str) -> Result<(), HostError> {
        self.client
            .repos(&repo.owner, &repo.name)
            .delete_ref(&Reference::Branch(branch_of(ref_name).to_string()))
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{ref_name}")))?;
        Ok(())
    }

    async fn default_branch(&self, repo: &Repo) -> Result<Branch, HostError> {
        let repository = self
            .client
            .repos(&repo.owner, &repo.name)
            .get()
            .await
            .map_err(|e| map_api_err(e, &repo.to_string()))?;
        let name = repository
            .default_branch
            .ok_or_else(|| HostError::Api(format!("{repo}: no default branch")))?;
        self.get_branch(repo, &name).await
    }

    async fn get_branch(&self, repo: &Repo, name: &str) -> Result<Branch, HostError> {
        let sha = self.get_ref(repo, &format!("heads/{name}")).await?;
        Ok(Branch {
            name: name.to_string(),
            sha,
        })
    }

    async fn list_branches(&self, repo: &Repo) -> Result<Vec<Branch>, HostError> {
        let what = format!("{repo} branches");
        let page = self
            .client
            .repos(&repo.owner, &repo.name)
            .list_branches()
            .per_page(100)
            .send()
            .await
            .map_err(|e| map_api_err(e, &what))?;
        let branches = self
            .client
            .all_pages(page)
            .await
            .map_err(|e| map_api_err(e, &what))?;

        Ok(branches
            .into_iter()
            .filter(|b| b.protected)
            .map(|b| Branch {
                name: b.name,
                sha: b.commit.sha,
            })
            .collect())
    }

    async fn list_open_pulls(
        &self,
        repo: &Repo,
        base: &str,
    ) -> Result<Vec<PullRequest>, HostError> {
        let what = format!("{repo} pulls (base={base})");
        let page = self
            .client
            .pulls(&repo.owner, &repo.name)
            .list()
            .state(octocrab::params::State::Open)
            .base(base)
            .per_page(100)
            .send()
            .await
            .map_err(|e| map_api_err(e, &what))?;
        let pulls = self
            .client
            .all_pages(page)
            .await
            .map_err(|e| map_api_err(e, &what))?;

        Ok(pulls
            .into_iter()
            .map(|pr| PullRequest {
                number: pr.number,
                head_ref: pr.head.ref_field,
                title: pr.title.unwrap_or_default(),
                body: pr.body.unwrap_or_default(),
                labels: pr
                    .labels
                    .unwrap_or_default()
                    .into_iter()
                    .map(|l| l.name)
                    .collect(),
                user_login: pr.user.map(|u| u.login).unwrap_or_default(),
            })
            .collect())
    }

    async fn create_pull(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<u64, HostError> {
        let pr = self
            .client
            .pulls(&repo.owner, &repo.name)
            .create(title, head, base)
            .body(body)
            .send()
            .await
            .map_err(|e| map_api_err(e, &format!("{repo} pull ({head} -> {base})")))?;
        Ok(pr.number)
    }

    async fn update_pull(
        &self,
        repo: &Repo,
        number: u64,
        update: PullRequestUpdate,
    ) -> Result<(), HostError> {
        let pulls_handler = self.client.pulls(&repo.owner, &repo.name);
        let mut builder = pulls_handler.update(number);
        if let Some(title) = update.title {
            builder = builder.title(title);
        }
        if let Some(body) = update.body {
            builder = builder.body(body);
        }
        builder
            .send()
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{number}")))?;
        Ok(())
    }

    async fn close_pull(&self, repo: &Repo, number: u64) -> Result<(), HostError> {
        self.client
            .pulls(&repo.owner, &repo.name)
            .update(number)
            .state(octocrab::params::pulls::State::Closed)
            .send()
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{number}")))?;
        Ok(())
    }

    async fn add_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<(), HostError> {
        self.client
            .issues(&repo.owner, &repo.name)
            .create_comment(number, body)
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{number}")))?;
        Ok(())
    }

    async fn list_labels(&self, repo: &Repo, number: u64) -> Result<Vec<String>, HostError> {
        let what = format!("{repo}#{number} labels");
        let page = self
            .client
            .issues(&repo.owner, &repo.name)
            .list_labels_for_issue(number)
            .per_page(100)
            .send()
            .await
            .map_err(|e| map_api_err(e, &what))?;
        let labels = self
            .client
            .all_pages(page)
            .await
            .map_err(|e| map_api_err(e, &what))?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn add_labels(
        &self,
        repo: &Repo,
        number: u64,
        labels: &[String],
    ) -> Result<(), HostError> {
        self.client
            .issues(&repo.owner, &repo.name)
            .add_labels(number, labels)
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{number}")))?;
        Ok(())
    }

    async fn remove_label(&self, repo: &Repo, number: u64, label: &str) -> Result<(), HostError> {
        self.client
            .issues(&repo.owner, &repo.name)
            .remove_label(number, label)
            .await
            .map_err(|e| map_api_err(e, &format!("{repo}#{number}")))?;
        Ok(())
    }
}
