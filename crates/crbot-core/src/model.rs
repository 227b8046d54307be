//! Hosting-service data as seen by the compliance engine.

use serde::{Deserialize, Serialize};

use crate::account::Account;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

impl PullRequest {
    pub fn new(number: u64, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One side (author or committer) of a commit.
///
/// `name` and `email` come from the git metadata, `login` from the
/// hosting service's user association, which is absent when the identity
/// is not linked to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub login: Option<String>,
}

impl Signature {
    pub fn new(name: &str, email: &str, login: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            login: Some(login.to_string()),
        }
    }

    /// Same as [`Signature::new`] with no hosting account linked.
    pub fn unlinked(name: &str, email: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            login: None,
        }
    }

    /// The identity this signature denotes; missing fields become empty.
    pub fn identity(&self) -> Account {
        Account {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            login: self.login.clone().unwrap_or_default(),
        }
    }

    /// The linked login, if present and non-empty.
    pub fn linked_login(&self) -> Option<&str> {
        self.login.as_deref().filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author: Signature,
    pub committer: Signature,
}

impl Commit {
    pub fn new(sha: impl Into<String>, author: Signature, committer: Signature) -> Self {
        Self {
            sha: sha.into(),
            author,
            committer,
        }
    }

    /// Logins linked to the commit: author first, then committer.
    pub fn logins(&self) -> impl Iterator<Item = &str> {
        self.author
            .linked_login()
            .into_iter()
            .chain(self.committer.linked_login())
    }
}

/// Review verdict submitted on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewVerdict {
    Approve,
    RequestChanges,
}

impl ReviewVerdict {
    /// The event name GitHub expects when creating a review.
    pub fn as_event(&self) -> &'static str {
        match self {
            ReviewVerdict::Approve => "APPROVE",
            ReviewVerdict::RequestChanges => "REQUEST_CHANGES",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_signature_fields_become_empty() {
        let sig = Signature::unlinked("Jane", "jane@example.com");
        let identity = sig.identity();
        assert_eq!(identity.name, "Jane");
        assert_eq!(identity.login, "");
        assert!(identity.is_incomplete());
    }

    #[test]
    fn test_commit_logins_skip_absent_and_empty() {
        let commit = Commit::new(
            "abc",
            Signature::new("A", "a@example.com", ""),
            Signature::new("C", "c@example.com", "committer"),
        );
        assert_eq!(commit.logins().collect::<Vec<_>>(), vec!["committer"]);
    }

    #[test]
    fn test_review_verdict_event_names() {
        assert_eq!(ReviewVerdict::Approve.as_event(), "APPROVE");
        assert_eq!(ReviewVerdict::RequestChanges.as_event(), "REQUEST_CHANGES");
    }
}
