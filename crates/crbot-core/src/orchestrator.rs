//! Drives compliance checks and reconciliation across an organization.
//!
//! Repositories, and the pull requests within each, are processed one at a
//! time in the order the host returns them. A read failure skips only the
//! repository or pull request it concerns; a write failure is logged and
//! counted, and the next run reconciles whatever was missed.

use std::sync::Arc;

use tracing::{info, Instrument};
use uuid::Uuid;

use crate::aggregator::ComplianceAggregator;
use crate::error::{HostResult, Result};
use crate::host::{HostReader, HostWriter};
use crate::labels::{reconcile, ClaLabel, ClaLabelSet};
use crate::model::{PullRequest, Repository};
use crate::mutation::{apply_mutation, plan_mutations};
use crate::notify::{notification_for, NotificationPolicy};
use crate::obs;
use crate::report::{PullReport, PullVerdict, RepoReport, RunReport};

/// What to process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    pub org: String,
    /// A single repository; all repositories of `org` when `None`.
    pub repo: Option<String>,
    /// Specific pull requests; all open ones when empty.
    pub pulls: Vec<u64>,
}

/// How to process it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Perform writes. When false, writes are only logged.
    pub update_repo: bool,
    pub notification: NotificationPolicy,
}

pub struct Orchestrator {
    reader: Arc<dyn HostReader>,
    writer: Arc<dyn HostWriter>,
    aggregator: ComplianceAggregator,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(
        reader: Arc<dyn HostReader>,
        writer: Arc<dyn HostWriter>,
        aggregator: ComplianceAggregator,
        options: RunOptions,
    ) -> Self {
        Self {
            reader,
            writer,
            aggregator,
            options,
        }
    }

    /// Process every repository and pull request selected by `spec`.
    ///
    /// Fails only if the repositories themselves cannot be looked up.
    pub async fn run(&self, spec: &ProcessSpec) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = obs::run_span(&run_id.to_string(), &spec.org);
        self.run_with_id(run_id, spec).instrument(span).await
    }

    async fn run_with_id(&self, run_id: Uuid, spec: &ProcessSpec) -> Result<RunReport> {
        obs::emit_run_started(
            &run_id.to_string(),
            &spec.org,
            self.options.update_repo,
            self.options.notification.as_str(),
        );

        let mut report = RunReport::new(
            run_id,
            &spec.org,
            self.options.update_repo,
            self.options.notification,
        );

        for repo in self.repositories(spec).await? {
            let repo_report = self.process_repository(&spec.org, &repo, &spec.pulls).await;
            report.repositories.push(repo_report);
        }

        obs::emit_run_finished(
            &run_id.to_string(),
            report.compliant_count(),
            report.non_compliant_count(),
            report.external_count(),
            report.skipped_count(),
        );
        Ok(report)
    }

    /// The single named repository, or every repository of the organization.
    pub async fn repositories(&self, spec: &ProcessSpec) -> Result<Vec<Repository>> {
        let repos = match &spec.repo {
            Some(name) => vec![self.reader.get_repository(&spec.org, name).await?],
            None => self.reader.list_repositories(&spec.org).await?,
        };
        Ok(repos)
    }

    /// Which enforcement labels `repo` defines. A failed probe counts as undefined.
    pub async fn repo_label_support(&self, org: &str, repo: &str) -> ClaLabelSet {
        let mut supported = ClaLabelSet::default();
        for label in ClaLabel::ALL {
            match self.reader.get_label(org, repo, label.name()).await {
                Ok(found) => supported.set(label, found.is_some()),
                Err(e) => {
                    obs::emit_unit_skipped(&format!("{org}/{repo} label [{label}]"), &e);
                }
            }
        }
        supported
    }

    pub async fn process_repository(
        &self,
        org: &str,
        repo: &Repository,
        pull_numbers: &[u64],
    ) -> RepoReport {
        info!("Repo: {}/{}", org, repo.name);

        let labels_defined = self.repo_label_support(org, &repo.name).await;
        let mut report = RepoReport {
            name: repo.name.clone(),
            labels_defined,
            pulls: Vec::new(),
            error: None,
        };

        if pull_numbers.is_empty() {
            match self.reader.list_pull_requests(org, &repo.name).await {
                Ok(pulls) => {
                    for pull in &pulls {
                        let pull_report = self
                            .process_pull_request(org, &repo.name, pull, labels_defined)
                            .await;
                        report.pulls.push(pull_report);
                    }
                }
                Err(e) => {
                    obs::emit_unit_skipped(&format!("{org}/{}", repo.name), &e);
                    report.error = Some(e.to_string());
                }
            }
        } else {
            for &number in pull_numbers {
                let pull_report = match self.reader.get_pull_request(org, &repo.name, number).await
                {
                    Ok(pull) => {
                        self.process_pull_request(org, &repo.name, &pull, labels_defined)
                            .await
                    }
                    Err(e) => {
                        obs::emit_unit_skipped(&format!("{org}/{}#{number}", repo.name), &e);
                        PullReport::skipped(number, "", &e)
                    }
                };
                report.pulls.push(pull_report);
            }
        }

        report
    }

    async fn observed_labels(&self, org: &str, repo: &str, number: u64) -> HostResult<ClaLabelSet> {
        let labels = self.reader.list_issue_labels(org, repo, number).await?;
        Ok(ClaLabelSet::from_labels(&labels))
    }

    /// Evaluate one pull request and reconcile its labels and notification.
    pub async fn process_pull_request(
        &self,
        org: &str,
        repo: &str,
        pull: &PullRequest,
        supported: ClaLabelSet,
    ) -> PullReport {
        info!("PR {}: {}", pull.number, pull.title);

        let status = match self
            .aggregator
            .check_pull_request(self.reader.as_ref(), org, repo, pull.number)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                obs::emit_unit_skipped(&format!("{org}/{repo}#{}", pull.number), &e);
                return PullReport::skipped(pull.number, pull.title.clone(), &e);
            }
        };
        obs::emit_pull_evaluated(
            repo,
            pull.number,
            status.compliant,
            status.external,
            &status.non_compliance_reason,
        );

        let observed = match self.observed_labels(org, repo, pull.number).await {
            Ok(observed) => observed,
            Err(e) => {
                obs::emit_unit_skipped(&format!("{org}/{repo}#{} labels", pull.number), &e);
                return PullReport::skipped(pull.number, pull.title.clone(), &e);
            }
        };
        info!(
            "CLA label status [{}]: {}, [{}]: {}, [{}]: {}",
            ClaLabel::Signed,
            observed.signed,
            ClaLabel::NotSigned,
            observed.not_signed,
            ClaLabel::External,
            observed.external
        );

        let plan = reconcile(&status, supported, observed);
        let notification = notification_for(self.options.notification, &status, &plan);
        let mutations = plan_mutations(&plan, notification);

        let mut applied = 0;
        let mut failed = 0;
        for mutation in &mutations {
            obs::emit_mutation(repo, pull.number, mutation, self.options.update_repo);
            if !self.options.update_repo {
                continue;
            }
            match apply_mutation(self.writer.as_ref(), org, repo, pull.number, mutation).await {
                Ok(()) => applied += 1,
                Err(e) => {
                    obs::emit_mutation_failed(repo, pull.number, mutation, &e);
                    failed += 1;
                }
            }
        }

        PullReport {
            number: pull.number,
            title: pull.title.clone(),
            verdict: PullVerdict::from(&status),
            mutations,
            applied,
            failed,
        }
    }
}
