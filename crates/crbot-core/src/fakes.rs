//! In-memory host (testing only)
//!
//! [`MemoryHost`] implements both [`HostReader`] and [`HostWriter`] over a
//! single organization held in memory. Writes change the stored labels and
//! are recorded in order; reads and writes can be made to fail.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{HostError, HostResult};
use crate::host::{HostReader, HostWriter};
use crate::model::{Commit, Label, PullRequest, Repository, ReviewVerdict};

/// A write recorded by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    AddLabels {
        repo: String,
        number: u64,
        labels: Vec<String>,
    },
    RemoveLabel {
        repo: String,
        number: u64,
        label: String,
    },
    Comment {
        repo: String,
        number: u64,
        body: String,
    },
    Review {
        repo: String,
        number: u64,
        verdict: ReviewVerdict,
        body: String,
    },
}

#[derive(Debug)]
struct FakePull {
    pull: PullRequest,
    commits: Vec<Commit>,
    labels: Vec<String>,
}

#[derive(Debug)]
struct FakeRepo {
    name: String,
    defined_labels: Vec<String>,
    pulls: Vec<FakePull>,
}

#[derive(Debug, Default)]
struct HostState {
    repos: Vec<FakeRepo>,
    writes: Vec<WriteCall>,
    failing_commit_lists: HashSet<(String, u64)>,
    failing_pull_lists: HashSet<String>,
    fail_repo_listing: bool,
    fail_writes: bool,
}

impl HostState {
    fn repo(&self, name: &str) -> HostResult<&FakeRepo> {
        self.repos
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| not_found(format!("repository {name}")))
    }

    fn repo_mut(&mut self, name: &str) -> HostResult<&mut FakeRepo> {
        self.repos
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| not_found(format!("repository {name}")))
    }

    fn pull(&self, repo: &str, number: u64) -> HostResult<&FakePull> {
        self.repo(repo)?
            .pulls
            .iter()
            .find(|p| p.pull.number == number)
            .ok_or_else(|| not_found(format!("pull request {repo}#{number}")))
    }

    fn pull_mut(&mut self, repo: &str, number: u64) -> HostResult<&mut FakePull> {
        self.repo_mut(repo)?
            .pulls
            .iter_mut()
            .find(|p| p.pull.number == number)
            .ok_or_else(|| not_found(format!("pull request {repo}#{number}")))
    }
}

fn not_found(resource: String) -> HostError {
    HostError::NotFound { resource }
}

fn injected(what: &str) -> HostError {
    HostError::Api {
        status: 500,
        message: format!("injected failure: {what}"),
    }
}

/// In-memory hosting service for one organization.
#[derive(Debug)]
pub struct MemoryHost {
    org: String,
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new(org: &str) -> Self {
        Self {
            org: org.to_string(),
            state: Mutex::new(HostState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_org(&self, org: &str) -> HostResult<()> {
        if org == self.org {
            Ok(())
        } else {
            Err(not_found(format!("organization {org}")))
        }
    }

    /// Add a repository defining the given labels.
    pub fn with_repo(self, name: &str, defined_labels: &[&str]) -> Self {
        self.state().repos.push(FakeRepo {
            name: name.to_string(),
            defined_labels: defined_labels.iter().map(|l| l.to_string()).collect(),
            pulls: Vec::new(),
        });
        self
    }

    /// Add an open pull request to an existing repository.
    ///
    /// Panics if the repository was not added first.
    pub fn with_pull(
        self,
        repo: &str,
        pull: PullRequest,
        commits: Vec<Commit>,
        labels: &[&str],
    ) -> Self {
        {
            let mut state = self.state();
            let fake_repo = state
                .repo_mut(repo)
                .unwrap_or_else(|_| panic!("repository {repo} must be added before its pulls"));
            fake_repo.pulls.push(FakePull {
                pull,
                commits,
                labels: labels.iter().map(|l| l.to_string()).collect(),
            });
        }
        self
    }

    /// Make `list_commits` fail for one pull request.
    pub fn fail_commits_for(self, repo: &str, number: u64) -> Self {
        self.state()
            .failing_commit_lists
            .insert((repo.to_string(), number));
        self
    }

    /// Make `list_pull_requests` fail for one repository.
    pub fn fail_pull_listing(self, repo: &str) -> Self {
        self.state().failing_pull_lists.insert(repo.to_string());
        self
    }

    /// Make `list_repositories` fail.
    pub fn fail_repo_listing(self) -> Self {
        self.state().fail_repo_listing = true;
        self
    }

    /// Make every write fail (nothing is recorded).
    pub fn fail_writes(self) -> Self {
        self.state().fail_writes = true;
        self
    }

    /// Writes performed so far, in order.
    pub fn writes(&self) -> Vec<WriteCall> {
        self.state().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state().writes.clear();
    }

    /// Labels currently applied to a pull request.
    pub fn labels_on(&self, repo: &str, number: u64) -> Vec<String> {
        self.state()
            .pull(repo, number)
            .map(|p| p.labels.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: WriteCall) -> HostResult<MutexGuard<'_, HostState>> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(injected("write"));
        }
        state.writes.push(call);
        Ok(state)
    }
}

#[async_trait]
impl HostReader for MemoryHost {
    async fn list_repositories(&self, org: &str) -> HostResult<Vec<Repository>> {
        self.check_org(org)?;
        let state = self.state();
        if state.fail_repo_listing {
            return Err(injected("list repositories"));
        }
        Ok(state.repos.iter().map(|r| Repository::new(&r.name)).collect())
    }

    async fn get_repository(&self, org: &str, repo: &str) -> HostResult<Repository> {
        self.check_org(org)?;
        let state = self.state();
        state.repo(repo).map(|r| Repository::new(&r.name))
    }

    async fn list_pull_requests(&self, org: &str, repo: &str) -> HostResult<Vec<PullRequest>> {
        self.check_org(org)?;
        let state = self.state();
        if state.failing_pull_lists.contains(repo) {
            return Err(injected("list pull requests"));
        }
        Ok(state.repo(repo)?.pulls.iter().map(|p| p.pull.clone()).collect())
    }

    async fn get_pull_request(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> HostResult<PullRequest> {
        self.check_org(org)?;
        let state = self.state();
        state.pull(repo, number).map(|p| p.pull.clone())
    }

    async fn list_commits(&self, org: &str, repo: &str, number: u64) -> HostResult<Vec<Commit>> {
        self.check_org(org)?;
        let state = self.state();
        if state
            .failing_commit_lists
            .contains(&(repo.to_string(), number))
        {
            return Err(injected("list commits"));
        }
        state.pull(repo, number).map(|p| p.commits.clone())
    }

    async fn get_label(&self, org: &str, repo: &str, name: &str) -> HostResult<Option<Label>> {
        self.check_org(org)?;
        let state = self.state();
        Ok(state
            .repo(repo)?
            .defined_labels
            .iter()
            .find(|l| l.eq_ignore_ascii_case(name))
            .map(Label::new))
    }

    async fn list_issue_labels(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> HostResult<Vec<Label>> {
        self.check_org(org)?;
        let state = self.state();
        Ok(state
            .pull(repo, number)?
            .labels
            .iter()
            .map(Label::new)
            .collect())
    }
}

#[async_trait]
impl HostWriter for MemoryHost {
    async fn add_labels(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> HostResult<()> {
        self.check_org(org)?;
        let mut state = self.record(WriteCall::AddLabels {
            repo: repo.to_string(),
            number,
            labels: labels.to_vec(),
        })?;
        let pull = state.pull_mut(repo, number)?;
        for label in labels {
            if !pull.labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                pull.labels.push(label.clone());
            }
        }
        Ok(())
    }

    async fn remove_label(&self, org: &str, repo: &str, number: u64, label: &str) -> HostResult<()> {
        self.check_org(org)?;
        let mut state = self.record(WriteCall::RemoveLabel {
            repo: repo.to_string(),
            number,
            label: label.to_string(),
        })?;
        let pull = state.pull_mut(repo, number)?;
        pull.labels.retain(|l| !l.eq_ignore_ascii_case(label));
        Ok(())
    }

    async fn create_comment(&self, org: &str, repo: &str, number: u64, body: &str) -> HostResult<()> {
        self.check_org(org)?;
        let mut state = self.record(WriteCall::Comment {
            repo: repo.to_string(),
            number,
            body: body.to_string(),
        })?;
        state.pull_mut(repo, number).map(|_| ())
    }

    async fn create_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        verdict: ReviewVerdict,
        body: &str,
    ) -> HostResult<()> {
        self.check_org(org)?;
        let mut state = self.record(WriteCall::Review {
            repo: repo.to_string(),
            number,
            verdict,
            body: body.to_string(),
        })?;
        state.pull_mut(repo, number).map(|_| ())
    }
}
