//! GitHub REST client
//!
//! Implements the crbot host traits on top of the GitHub v3 REST API.
//! List endpoints are paginated through the `Link` header.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crbot_core::{
    Commit, HostReader, HostResult, HostWriter, Label, PullRequest, Repository, ReviewVerdict,
    Signature,
};

use crate::error::GitHubError;
use crate::Result;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "crbot";
const ACCEPT: &str = "application/vnd.github+json";
const PER_PAGE: &str = "100";
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepoWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullWire {
    number: u64,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GitIdentityWire {
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitCommitWire {
    author: Option<GitIdentityWire>,
    committer: Option<GitIdentityWire>,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommitWire {
    sha: String,
    commit: GitCommitWire,
    author: Option<UserWire>,
    committer: Option<UserWire>,
}

#[derive(Debug, Deserialize)]
struct LabelWire {
    name: String,
}

fn signature(git: Option<GitIdentityWire>, user: Option<UserWire>) -> Signature {
    let git = git.unwrap_or_default();
    Signature {
        name: git.name,
        email: git.email,
        login: user.map(|u| u.login),
    }
}

impl From<CommitWire> for Commit {
    fn from(wire: CommitWire) -> Self {
        Commit {
            sha: wire.sha,
            author: signature(wire.commit.author, wire.author),
            committer: signature(wire.commit.committer, wire.committer),
        }
    }
}

impl From<PullWire> for PullRequest {
    fn from(wire: PullWire) -> Self {
        PullRequest::new(wire.number, wire.title.unwrap_or_default())
    }
}

/// The `rel="next"` target of a `Link` header, if any.
fn next_page(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

/// GitHub API client authenticated with a personal access token
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitHubClient {
    /// Client for api.github.com
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL, token)
    }

    /// Client for another API root (GitHub Enterprise, test servers)
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| GitHubError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: parsed,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` extended with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        debug!("GitHub {} {}", method, url);
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, mut url: Url) -> Result<Vec<T>> {
        url.query_pairs_mut().append_pair("per_page", PER_PAGE);

        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let response = self.send(Method::GET, url, None).await?;
            next = next_page(response.headers());
            let bytes = response.bytes().await?;
            let page: Vec<T> = serde_json::from_slice(&bytes)?;
            items.extend(page);
        }
        Ok(items)
    }

    /// Repositories of an organization, falling back to a user account's.
    pub async fn repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        let org_repos = self
            .get_all::<RepoWire>(self.endpoint(&["orgs", owner, "repos"])?)
            .await;
        let repos = match org_repos {
            Err(e) if e.is_not_found() => {
                debug!("{} is not an organization, listing user repositories", owner);
                self.get_all::<RepoWire>(self.endpoint(&["users", owner, "repos"])?)
                    .await?
            }
            other => other?,
        };
        Ok(repos.into_iter().map(|r| Repository::new(r.name)).collect())
    }

    pub async fn repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let wire: RepoWire = self.get_json(self.endpoint(&["repos", owner, repo])?).await?;
        Ok(Repository::new(wire.name))
    }

    /// Open pull requests.
    pub async fn open_pulls(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        let mut url = self.endpoint(&["repos", owner, repo, "pulls"])?;
        url.query_pairs_mut().append_pair("state", "open");
        let pulls: Vec<PullWire> = self.get_all(url).await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    pub async fn pull(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let number = number.to_string();
        let wire: PullWire = self
            .get_json(self.endpoint(&["repos", owner, repo, "pulls", &number])?)
            .await?;
        Ok(wire.into())
    }

    pub async fn pull_commits(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Commit>> {
        let number = number.to_string();
        let commits: Vec<CommitWire> = self
            .get_all(self.endpoint(&["repos", owner, repo, "pulls", &number, "commits"])?)
            .await?;
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    /// A repository label, `None` when it is not defined.
    pub async fn label(&self, owner: &str, repo: &str, name: &str) -> Result<Option<Label>> {
        let url = self.endpoint(&["repos", owner, repo, "labels", name])?;
        match self.get_json::<LabelWire>(url).await {
            Ok(wire) => Ok(Some(Label::new(wire.name))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn issue_labels(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Label>> {
        let number = number.to_string();
        let labels: Vec<LabelWire> = self
            .get_all(self.endpoint(&["repos", owner, repo, "issues", &number, "labels"])?)
            .await?;
        Ok(labels.into_iter().map(|l| Label::new(l.name)).collect())
    }

    pub async fn add_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "issues", &number, "labels"])?;
        self.send(
            Method::POST,
            url,
            Some(serde_json::json!({ "labels": labels })),
        )
        .await?;
        Ok(())
    }

    /// Remove a label from an issue; a label that is not applied is not an error.
    pub async fn remove_issue_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<()> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "issues", &number, "labels", label])?;
        match self.send(Method::DELETE, url, None).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Label '{}' not on {}/{}#{}", label, owner, repo, number);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<()> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "issues", &number, "comments"])?;
        self.send(Method::POST, url, Some(serde_json::json!({ "body": body })))
            .await?;
        Ok(())
    }

    pub async fn review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        verdict: ReviewVerdict,
        body: &str,
    ) -> Result<()> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "pulls", &number, "reviews"])?;
        self.send(
            Method::POST,
            url,
            Some(serde_json::json!({ "body": body, "event": verdict.as_event() })),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl HostReader for GitHubClient {
    async fn list_repositories(&self, org: &str) -> HostResult<Vec<Repository>> {
        Ok(self.repositories(org).await?)
    }

    async fn get_repository(&self, org: &str, repo: &str) -> HostResult<Repository> {
        Ok(self.repository(org, repo).await?)
    }

    async fn list_pull_requests(&self, org: &str, repo: &str) -> HostResult<Vec<PullRequest>> {
        Ok(self.open_pulls(org, repo).await?)
    }

    async fn get_pull_request(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> HostResult<PullRequest> {
        Ok(self.pull(org, repo, number).await?)
    }

    async fn list_commits(&self, org: &str, repo: &str, number: u64) -> HostResult<Vec<Commit>> {
        Ok(self.pull_commits(org, repo, number).await?)
    }

    async fn get_label(&self, org: &str, repo: &str, name: &str) -> HostResult<Option<Label>> {
        Ok(self.label(org, repo, name).await?)
    }

    async fn list_issue_labels(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> HostResult<Vec<Label>> {
        Ok(self.issue_labels(org, repo, number).await?)
    }
}

#[async_trait]
impl HostWriter for GitHubClient {
    async fn add_labels(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> HostResult<()> {
        Ok(self.add_issue_labels(org, repo, number, labels).await?)
    }

    async fn remove_label(&self, org: &str, repo: &str, number: u64, label: &str) -> HostResult<()> {
        Ok(self.remove_issue_label(org, repo, number, label).await?)
    }

    async fn create_comment(&self, org: &str, repo: &str, number: u64, body: &str) -> HostResult<()> {
        Ok(self.comment(org, repo, number, body).await?)
    }

    async fn create_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        verdict: ReviewVerdict,
        body: &str,
    ) -> HostResult<()> {
        Ok(self.review(org, repo, number, verdict, body).await?)
    }
}
