//! Per-commit CLA compliance.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::{matches_any, Account};
use crate::model::Commit;
use crate::roster::ClaSigners;

/// A single reason a commit fails the CLA check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitFailure {
    /// Author name, email or login is missing.
    AuthorIdentity,
    /// Committer name, email or login is missing.
    CommitterIdentity,
    /// The author is not a listed individual or company signer.
    AuthorNotSigner,
    /// The committer is not a listed individual, bot, or company signer.
    CommitterNotSigner,
}

impl CommitFailure {
    /// Human-readable explanation, suitable for a comment or review body.
    pub fn message(&self) -> &'static str {
        match self {
            CommitFailure::AuthorIdentity => {
                "Please verify the author name, email, and GitHub username association are all correct and match CLA records."
            }
            CommitFailure::CommitterIdentity => {
                "Please verify the committer name, email, and GitHub username association are all correct and match CLA records."
            }
            CommitFailure::AuthorNotSigner => {
                "Author of one or more commits is not listed as a CLA signer, either individual or as a member of an organization."
            }
            CommitFailure::CommitterNotSigner => {
                "Committer of one or more commits is not listed as a CLA signer, either individual or as a member of an organization."
            }
        }
    }
}

impl fmt::Display for CommitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of checking one commit.
///
/// `failures` lists every problem found, in detection order;
/// `non_compliance_reason` reports only the last of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub compliant: bool,
    pub non_compliance_reason: String,
    pub external: bool,
    pub failures: Vec<CommitFailure>,
}

impl CommitStatus {
    fn from_failures(failures: Vec<CommitFailure>) -> Self {
        let non_compliance_reason = failures
            .last()
            .map(|f| f.message().to_string())
            .unwrap_or_default();
        Self {
            compliant: failures.is_empty(),
            non_compliance_reason,
            external: false,
            failures,
        }
    }

    /// Status recorded for a commit that was classified as external.
    pub fn external() -> Self {
        Self {
            compliant: true,
            non_compliance_reason: String::new(),
            external: true,
            failures: Vec::new(),
        }
    }
}

/// Decides compliance of a single commit.
pub trait CommitChecker: Send + Sync {
    fn check(&self, commit: &Commit) -> CommitStatus;
}

/// Checks one commit against the roster.
///
/// Both sides must have a complete identity (name, email and login). Only
/// when both do is the roster consulted: the author must be one of the
/// people or company people, the committer one of the people, bots or
/// company people. Bots may commit but not author.
pub fn check_commit(commit: &Commit, roster: &ClaSigners) -> CommitStatus {
    info!(sha = %commit.sha, "checking commit");

    let author = commit.author.identity();
    let committer = commit.committer.identity();

    let mut failures = Vec::new();
    if author.is_incomplete() {
        failures.push(CommitFailure::AuthorIdentity);
    }
    if committer.is_incomplete() {
        failures.push(CommitFailure::CommitterIdentity);
    }

    if failures.is_empty() {
        if !matches_any(&author, roster.authors()) {
            failures.push(CommitFailure::AuthorNotSigner);
        }
        if !matches_any(&committer, roster.committers()) {
            failures.push(CommitFailure::CommitterNotSigner);
        }
    }

    log_identity("author", &author);
    log_identity("committer", &committer);

    CommitStatus::from_failures(failures)
}

fn log_identity(role: &str, account: &Account) {
    info!(
        "{}: {} <{}>, GitHub: {}",
        role, account.name, account.email, account.login
    );
}

/// [`CommitChecker`] backed by the run's roster.
#[derive(Debug, Clone)]
pub struct RosterChecker {
    roster: Arc<ClaSigners>,
}

impl RosterChecker {
    pub fn new(roster: Arc<ClaSigners>) -> Self {
        Self { roster }
    }
}

impl CommitChecker for RosterChecker {
    fn check(&self, commit: &Commit) -> CommitStatus {
        check_commit(commit, &self.roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signature;
    use crate::roster::Company;

    fn jane() -> Signature {
        Signature::new("Jane Doe", "jane@example.com", "janedoe")
    }

    fn roster() -> ClaSigners {
        ClaSigners {
            people: vec![Account::new("Jane Doe", "jane@example.com", "janedoe")],
            bots: vec![Account::new("Merge Bot", "bot@example.com", "merge-bot")],
            companies: vec![Company {
                name: "Acme".to_string(),
                domains: vec![],
                people: vec![Account::new("Wile Coyote", "wile@acme.example", "wile")],
            }],
            external: None,
        }
    }

    #[test]
    fn test_listed_author_and_committer_is_compliant() {
        let status = check_commit(&Commit::new("a1", jane(), jane()), &roster());
        assert!(status.compliant);
        assert!(status.non_compliance_reason.is_empty());
        assert!(status.failures.is_empty());
        assert!(!status.external);
    }

    #[test]
    fn test_company_people_may_author_and_commit() {
        let wile = Signature::new("Wile Coyote", "wile@acme.example", "wile");
        let status = check_commit(&Commit::new("a1", wile.clone(), wile), &roster());
        assert!(status.compliant);
    }

    #[test]
    fn test_bot_may_commit_but_not_author() {
        let bot = Signature::new("Merge Bot", "bot@example.com", "merge-bot");

        let committed = check_commit(&Commit::new("a1", jane(), bot.clone()), &roster());
        assert!(committed.compliant);

        let authored = check_commit(&Commit::new("a2", bot, jane()), &roster());
        assert!(!authored.compliant);
        assert_eq!(authored.failures, vec![CommitFailure::AuthorNotSigner]);
        assert!(authored.non_compliance_reason.starts_with("Author"));
    }

    #[test]
    fn test_unlisted_committer_reason_mentions_committer() {
        let stranger = Signature::new("Stranger", "stranger@example.com", "stranger");
        let status = check_commit(&Commit::new("a1", jane(), stranger), &roster());
        assert!(!status.compliant);
        assert!(status
            .non_compliance_reason
            .to_lowercase()
            .contains("committer"));
    }

    #[test]
    fn test_missing_author_login_is_identity_failure() {
        let unlinked = Signature::unlinked("Jane Doe", "jane@example.com");
        let status = check_commit(&Commit::new("a1", unlinked, jane()), &roster());
        assert!(!status.compliant);
        assert_eq!(status.failures, vec![CommitFailure::AuthorIdentity]);
        assert!(status.non_compliance_reason.contains("author name"));
    }

    #[test]
    fn test_identity_failure_skips_roster_match() {
        let stranger = Signature::unlinked("Stranger", "stranger@example.com");
        let status = check_commit(&Commit::new("a1", jane(), stranger), &roster());
        assert_eq!(status.failures, vec![CommitFailure::CommitterIdentity]);
    }

    // Both sides fail: every failure is kept, but only the last is reported.
    #[test]
    fn test_last_failure_reason_wins_when_both_identities_incomplete() {
        let commit = Commit::new("a1", Signature::default(), Signature::default());
        let status = check_commit(&commit, &roster());
        assert_eq!(
            status.failures,
            vec![
                CommitFailure::AuthorIdentity,
                CommitFailure::CommitterIdentity
            ]
        );
        assert_eq!(
            status.non_compliance_reason,
            CommitFailure::CommitterIdentity.message()
        );
    }

    #[test]
    fn test_last_failure_reason_wins_when_both_unlisted() {
        let stranger = Signature::new("Stranger", "stranger@example.com", "stranger");
        let status = check_commit(&Commit::new("a1", stranger.clone(), stranger), &roster());
        assert_eq!(
            status.failures,
            vec![
                CommitFailure::AuthorNotSigner,
                CommitFailure::CommitterNotSigner
            ]
        );
        assert_eq!(
            status.non_compliance_reason,
            CommitFailure::CommitterNotSigner.message()
        );
    }

    #[test]
    fn test_gmail_dots_and_login_case_are_tolerated() {
        let roster = ClaSigners {
            people: vec![Account::new("Jane Doe", "jane.doe@gmail.com", "JaneDoe")],
            ..Default::default()
        };
        let sig = Signature::new("Jane Doe", "JaneDoe@gmail.com", "janedoe");
        let status = check_commit(&Commit::new("a1", sig.clone(), sig), &roster);
        assert!(status.compliant);
    }
}
