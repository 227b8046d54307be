//! Per-run summary of verdicts and writes.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregator::PullRequestStatus;
use crate::error::Result;
use crate::labels::ClaLabelSet;
use crate::mutation::Mutation;
use crate::notify::NotificationPolicy;

/// Verdict recorded for one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PullVerdict {
    Compliant,
    NonCompliant { reason: String },
    External,
    /// A read failed; the pull request was left untouched.
    Skipped { error: String },
}

impl From<&PullRequestStatus> for PullVerdict {
    fn from(status: &PullRequestStatus) -> Self {
        if status.external {
            PullVerdict::External
        } else if status.compliant {
            PullVerdict::Compliant
        } else {
            PullVerdict::NonCompliant {
                reason: status.non_compliance_reason.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullReport {
    pub number: u64,
    pub title: String,
    #[serde(flatten)]
    pub verdict: PullVerdict,
    /// Every write the verdict called for, applied or not.
    pub mutations: Vec<Mutation>,
    pub applied: usize,
    pub failed: usize,
}

impl PullReport {
    pub fn skipped(number: u64, title: impl Into<String>, error: &dyn std::fmt::Display) -> Self {
        Self {
            number,
            title: title.into(),
            verdict: PullVerdict::Skipped {
                error: error.to_string(),
            },
            mutations: Vec::new(),
            applied: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoReport {
    pub name: String,
    /// Enforcement labels defined on the repository.
    pub labels_defined: ClaLabelSet,
    pub pulls: Vec<PullReport>,
    /// Set when the pull requests could not be listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub org: String,
    pub generated_at: DateTime<Utc>,
    pub update_repo: bool,
    pub notification: NotificationPolicy,
    pub repositories: Vec<RepoReport>,
}

impl RunReport {
    pub fn new(run_id: Uuid, org: &str, update_repo: bool, notification: NotificationPolicy) -> Self {
        Self {
            run_id,
            org: org.to_string(),
            generated_at: Utc::now(),
            update_repo,
            notification,
            repositories: Vec::new(),
        }
    }

    pub fn pulls(&self) -> impl Iterator<Item = &PullReport> {
        self.repositories.iter().flat_map(|r| r.pulls.iter())
    }

    /// Look up a pull request by repository name and number.
    pub fn pull(&self, repo: &str, number: u64) -> Option<&PullReport> {
        self.repositories
            .iter()
            .find(|r| r.name == repo)
            .and_then(|r| r.pulls.iter().find(|p| p.number == number))
    }

    fn count(&self, pred: impl Fn(&PullVerdict) -> bool) -> usize {
        self.pulls().filter(|p| pred(&p.verdict)).count()
    }

    pub fn compliant_count(&self) -> usize {
        self.count(|v| matches!(v, PullVerdict::Compliant))
    }

    pub fn non_compliant_count(&self) -> usize {
        self.count(|v| matches!(v, PullVerdict::NonCompliant { .. }))
    }

    pub fn external_count(&self) -> usize {
        self.count(|v| matches!(v, PullVerdict::External))
    }

    /// Skipped pull requests plus repositories whose listing failed.
    pub fn skipped_count(&self) -> usize {
        self.count(|v| matches!(v, PullVerdict::Skipped { .. }))
            + self.repositories.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn failed_mutations(&self) -> usize {
        self.pulls().map(|p| p.failed).sum()
    }
}

/// Write the run report as pretty JSON.
pub fn write_run_report_json(path: &Path, report: &RunReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pull(number: u64, verdict: PullVerdict) -> PullReport {
        PullReport {
            number,
            title: format!("PR {number}"),
            verdict,
            mutations: vec![],
            applied: 0,
            failed: 0,
        }
    }

    fn sample() -> RunReport {
        let mut report = RunReport::new(
            Uuid::new_v4(),
            "org",
            false,
            NotificationPolicy::ReviewEveryRun,
        );
        report.repositories.push(RepoReport {
            name: "repo".to_string(),
            labels_defined: ClaLabelSet::all(),
            pulls: vec![
                pull(1, PullVerdict::Compliant),
                pull(
                    2,
                    PullVerdict::NonCompliant {
                        reason: "Committer ...".to_string(),
                    },
                ),
                pull(3, PullVerdict::External),
                pull(
                    4,
                    PullVerdict::Skipped {
                        error: "boom".to_string(),
                    },
                ),
            ],
            error: None,
        });
        report.repositories.push(RepoReport {
            name: "broken".to_string(),
            labels_defined: ClaLabelSet::default(),
            pulls: vec![],
            error: Some("listing failed".to_string()),
        });
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.compliant_count(), 1);
        assert_eq!(report.non_compliant_count(), 1);
        assert_eq!(report.external_count(), 1);
        assert_eq!(report.skipped_count(), 2);
        assert!(report.pull("repo", 3).is_some());
        assert!(report.pull("repo", 9).is_none());
    }

    #[test]
    fn test_write_json_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample();
        write_run_report_json(&path, &report).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"verdict\": \"non_compliant\""));
        let parsed: RunReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, report);
    }
}
