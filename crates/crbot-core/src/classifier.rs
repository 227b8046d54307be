//! Detection of commits whose CLA is managed outside crbot.
//!
//! A pull request with any such commit is skipped by enforcement; only the
//! external marker label is managed for it.

use std::sync::Arc;

use crate::model::Commit;
use crate::roster::ClaSigners;

/// Decides whether a commit is exempt from crbot's CLA enforcement.
pub trait ExternalClassifier: Send + Sync {
    fn is_external(&self, commit: &Commit) -> bool;
}

/// Returns whether `commit` belongs to an externally managed identity.
///
/// 1. Any linked login (author or committer) listed in the roster's
///    `external` section makes the commit external, even if the same login
///    is also in the main roster.
/// 2. Otherwise, with `unknown_as_external`, the commit is external when
///    none of its logins appears anywhere in the main roster.
///
/// Logins are compared exactly; name and email are ignored. A commit with
/// no linked login has nothing in the main roster, so it is external
/// exactly when `unknown_as_external` is set.
pub fn is_external(commit: &Commit, roster: &ClaSigners, unknown_as_external: bool) -> bool {
    let logins: Vec<&str> = commit.logins().collect();

    if let Some(external) = &roster.external {
        let listed = external
            .all_accounts()
            .any(|account| logins.contains(&account.login.as_str()));
        if listed {
            return true;
        }
    }

    if unknown_as_external {
        let known = roster
            .all_accounts()
            .any(|account| logins.contains(&account.login.as_str()));
        return !known;
    }

    false
}

/// [`ExternalClassifier`] backed by the run's roster.
#[derive(Debug, Clone)]
pub struct RosterClassifier {
    roster: Arc<ClaSigners>,
    unknown_as_external: bool,
}

impl RosterClassifier {
    pub fn new(roster: Arc<ClaSigners>, unknown_as_external: bool) -> Self {
        Self {
            roster,
            unknown_as_external,
        }
    }
}

impl ExternalClassifier for RosterClassifier {
    fn is_external(&self, commit: &Commit) -> bool {
        is_external(commit, &self.roster, self.unknown_as_external)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::model::Signature;
    use crate::roster::{Company, ExternalClaSigners};

    fn commit_by(author_login: &str, committer_login: &str) -> Commit {
        Commit::new(
            "0123abc",
            Signature::new("Author", "author@example.com", author_login),
            Signature::new("Committer", "committer@example.com", committer_login),
        )
    }

    fn roster_with_external() -> ClaSigners {
        ClaSigners {
            people: vec![
                Account::new("Listed", "listed@example.com", "listed"),
                Account::new("Both", "both@example.com", "both"),
            ],
            external: Some(ExternalClaSigners {
                people: vec![Account::new("Both", "both@example.com", "both")],
                bots: vec![Account::new("Ext Bot", "bot@example.com", "ext-bot")],
                companies: vec![Company {
                    name: "Elsewhere".to_string(),
                    domains: vec![],
                    people: vec![Account::new("Ext", "ext@example.com", "ext-employee")],
                }],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_external_people_take_precedence_over_main_roster() {
        let roster = roster_with_external();
        assert!(is_external(&commit_by("both", "listed"), &roster, false));
    }

    #[test]
    fn test_external_committer_bot_is_external() {
        let roster = roster_with_external();
        assert!(is_external(&commit_by("listed", "ext-bot"), &roster, false));
    }

    #[test]
    fn test_external_company_people_are_external() {
        let roster = roster_with_external();
        assert!(is_external(&commit_by("ext-employee", "listed"), &roster, false));
    }

    #[test]
    fn test_external_login_comparison_is_case_sensitive() {
        let roster = roster_with_external();
        assert!(!is_external(&commit_by("BOTH", "listed"), &roster, false));
    }

    #[test]
    fn test_unknown_login_follows_flag() {
        let roster = roster_with_external();
        let commit = commit_by("stranger", "stranger");
        assert!(is_external(&commit, &roster, true));
        assert!(!is_external(&commit, &roster, false));
    }

    #[test]
    fn test_one_known_login_is_enough_to_stay_internal() {
        let roster = roster_with_external();
        assert!(!is_external(&commit_by("stranger", "listed"), &roster, true));
    }

    #[test]
    fn test_commit_without_logins_follows_flag() {
        let roster = roster_with_external();
        let commit = Commit::new(
            "0123abc",
            Signature::unlinked("A", "a@example.com"),
            Signature::unlinked("A", "a@example.com"),
        );
        assert!(is_external(&commit, &roster, true));
        assert!(!is_external(&commit, &roster, false));
    }

    #[test]
    fn test_unknown_login_with_unlinked_side_follows_flag() {
        let roster = roster_with_external();
        let commit = Commit::new(
            "0123abc",
            Signature::new("Stranger", "stranger@example.com", "stranger"),
            Signature::unlinked("A", "a@example.com"),
        );
        assert!(is_external(&commit, &roster, true));
        assert!(!is_external(&commit, &roster, false));
    }

    #[test]
    fn test_roster_classifier_delegates() {
        let classifier = RosterClassifier::new(Arc::new(roster_with_external()), true);
        assert!(classifier.is_external(&commit_by("stranger", "stranger")));
        assert!(!classifier.is_external(&commit_by("listed", "listed")));
    }
}
