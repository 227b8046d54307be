//! Host collaborator contracts.
//!
//! The engine never talks to the hosting service directly: reads go through
//! [`HostReader`] and mutations through [`HostWriter`]. `crbot-github`
//! provides the GitHub implementation and [`crate::fakes::MemoryHost`] an
//! in-memory one for tests. Rate limiting, pagination and timeouts are the
//! implementation's concern.

use async_trait::async_trait;

use crate::error::HostResult;
use crate::model::{Commit, Label, PullRequest, Repository, ReviewVerdict};

/// Read side of the hosting service.
#[async_trait]
pub trait HostReader: Send + Sync {
    /// All repositories owned by `org`.
    async fn list_repositories(&self, org: &str) -> HostResult<Vec<Repository>>;

    async fn get_repository(&self, org: &str, repo: &str) -> HostResult<Repository>;

    /// Open pull requests of a repository.
    async fn list_pull_requests(&self, org: &str, repo: &str) -> HostResult<Vec<PullRequest>>;

    async fn get_pull_request(&self, org: &str, repo: &str, number: u64)
        -> HostResult<PullRequest>;

    /// Commits of a pull request, in the order the host lists them.
    async fn list_commits(&self, org: &str, repo: &str, number: u64) -> HostResult<Vec<Commit>>;

    /// A label defined on the repository, or `None` if it is not defined.
    async fn get_label(&self, org: &str, repo: &str, name: &str) -> HostResult<Option<Label>>;

    /// Labels currently applied to a pull request.
    async fn list_issue_labels(&self, org: &str, repo: &str, number: u64)
        -> HostResult<Vec<Label>>;
}

/// Write side of the hosting service.
#[async_trait]
pub trait HostWriter: Send + Sync {
    async fn add_labels(&self, org: &str, repo: &str, number: u64, labels: &[String])
        -> HostResult<()>;

    /// Removing a label that is not applied is not an error.
    async fn remove_label(&self, org: &str, repo: &str, number: u64, label: &str)
        -> HostResult<()>;

    async fn create_comment(&self, org: &str, repo: &str, number: u64, body: &str)
        -> HostResult<()>;

    async fn create_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        verdict: ReviewVerdict,
        body: &str,
    ) -> HostResult<()>;
}
