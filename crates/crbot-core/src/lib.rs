//! crbot core library
//!
//! Decides whether every commit of a pull request is covered by a
//! Contributor License Agreement and reconciles the verdict with the
//! labels, comments and reviews on the pull request.
//!
//! The hosting service is reached only through the [`HostReader`] and
//! [`HostWriter`] traits; nothing is cached between runs.

pub mod account;
pub mod aggregator;
pub mod checker;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fakes;
pub mod host;
pub mod labels;
pub mod model;
pub mod mutation;
pub mod notify;
pub mod obs;
pub mod orchestrator;
pub mod report;
pub mod roster;
pub mod telemetry;

pub use account::{account_matches, canonicalize_email, matches_any, Account};
pub use aggregator::{aggregate, CommitOutcome, ComplianceAggregator, PullRequestStatus};
pub use checker::{check_commit, CommitChecker, CommitFailure, CommitStatus, RosterChecker};
pub use classifier::{is_external, ExternalClassifier, RosterClassifier};
pub use config::{
    load_cla_signers, load_config, load_secrets, parse_pull_numbers, RunConfig, Secrets,
    TOKEN_ENV_VAR,
};
pub use error::{ConfigError, CrbotError, HostError, HostResult, Result};
pub use host::{HostReader, HostWriter};
pub use labels::{
    desired_label, reconcile, ClaLabel, ClaLabelSet, LabelPlan, LABEL_CLA_EXTERNAL, LABEL_CLA_NO,
    LABEL_CLA_YES,
};
pub use model::{Commit, Label, PullRequest, Repository, ReviewVerdict, Signature};
pub use mutation::{apply_mutation, plan_mutations, Mutation};
pub use notify::{notification_for, Notification, NotificationPolicy};
pub use orchestrator::{Orchestrator, ProcessSpec, RunOptions};
pub use report::{write_run_report_json, PullReport, PullVerdict, RepoReport, RunReport};
pub use roster::{ClaSigners, Company, ExternalClaSigners};
pub use telemetry::{init_tracing, LogFormat};

/// crbot version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
