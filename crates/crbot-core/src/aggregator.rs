//! Pull-request level CLA verdicts.
//!
//! [`ComplianceAggregator`] folds per-commit results into one
//! [`PullRequestStatus`]. External detection is an early exit: the first
//! external commit ends the scan, and later commits are neither classified
//! nor checked.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checker::{CommitChecker, CommitStatus, RosterChecker};
use crate::classifier::{ExternalClassifier, RosterClassifier};
use crate::error::Result;
use crate::host::HostReader;
use crate::model::Commit;
use crate::roster::ClaSigners;

/// Result recorded for one evaluated commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub sha: String,
    pub status: CommitStatus,
}

/// Verdict for a whole pull request.
///
/// When `external` is true enforcement is skipped for the pull request and
/// `compliant` carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestStatus {
    pub compliant: bool,
    pub non_compliance_reason: String,
    pub external: bool,
    /// Commits that were evaluated, in scan order.
    pub commits: Vec<CommitOutcome>,
}

impl Default for PullRequestStatus {
    fn default() -> Self {
        Self {
            compliant: true,
            non_compliance_reason: String::new(),
            external: false,
            commits: Vec::new(),
        }
    }
}

/// Combines an [`ExternalClassifier`] and a [`CommitChecker`].
#[derive(Clone)]
pub struct ComplianceAggregator {
    classifier: Arc<dyn ExternalClassifier>,
    checker: Arc<dyn CommitChecker>,
}

impl ComplianceAggregator {
    pub fn new(classifier: Arc<dyn ExternalClassifier>, checker: Arc<dyn CommitChecker>) -> Self {
        Self {
            classifier,
            checker,
        }
    }

    /// Aggregator using the roster-backed classifier and checker.
    pub fn for_roster(roster: Arc<ClaSigners>, unknown_as_external: bool) -> Self {
        Self::new(
            Arc::new(RosterClassifier::new(roster.clone(), unknown_as_external)),
            Arc::new(RosterChecker::new(roster)),
        )
    }

    /// Aggregate `commits` in order.
    ///
    /// The reason of the last non-compliant commit wins.
    pub fn aggregate(&self, commits: &[Commit]) -> PullRequestStatus {
        let mut status = PullRequestStatus::default();

        for commit in commits {
            if self.classifier.is_external(commit) {
                info!(sha = %commit.sha, "commit is covered by an external CLA process");
                status.external = true;
                status.commits.push(CommitOutcome {
                    sha: commit.sha.clone(),
                    status: CommitStatus::external(),
                });
                break;
            }

            let commit_status = self.checker.check(commit);
            if commit_status.compliant {
                info!(sha = %commit.sha, "compliant: true");
            } else {
                info!(
                    sha = %commit.sha,
                    "compliant: false: {}",
                    commit_status.non_compliance_reason
                );
                status.compliant = false;
                status.non_compliance_reason = commit_status.non_compliance_reason.clone();
            }
            status.commits.push(CommitOutcome {
                sha: commit.sha.clone(),
                status: commit_status,
            });
        }

        status
    }

    /// Fetch the commits of a pull request and aggregate them.
    ///
    /// A failed commit listing is returned as an error, never as a
    /// non-compliant verdict.
    pub async fn check_pull_request(
        &self,
        reader: &dyn HostReader,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestStatus> {
        let commits = reader.list_commits(org, repo, number).await?;
        Ok(self.aggregate(&commits))
    }
}

/// Aggregate `commits` against `roster` with the default classifier and checker.
pub fn aggregate(
    commits: &[Commit],
    roster: &ClaSigners,
    unknown_as_external: bool,
) -> PullRequestStatus {
    ComplianceAggregator::for_roster(Arc::new(roster.clone()), unknown_as_external)
        .aggregate(commits)
}
