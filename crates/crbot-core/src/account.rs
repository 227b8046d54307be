//! Identity comparison: email canonicalization and roster account matching.

use serde::{Deserialize, Serialize};

/// Gmail ignores dots in the local part of addresses on these domains.
const DOT_INSENSITIVE_DOMAINS: [&str; 2] = ["gmail.com", "googlemail.com"];

/// One human or bot identity, as declared in the roster or observed on a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Hosting-service username; spelled `github` in roster files.
    #[serde(rename = "github", default)]
    pub login: String,
}

impl Account {
    pub fn new(name: impl Into<String>, email: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            login: login.into(),
        }
    }

    /// True when any of name, email or login is empty.
    pub fn is_incomplete(&self) -> bool {
        self.name.is_empty() || self.email.is_empty() || self.login.is_empty()
    }
}

/// Returns the canonical form of `email` for comparison purposes.
///
/// The whole address is lower-cased. For Gmail addresses the dots in the
/// local part are also removed, so `User.Name@gmail.com` and
/// `username@gmail.com` compare equal. No other normalization is applied
/// (`+tag` suffixes are kept).
pub fn canonicalize_email(email: &str) -> String {
    let lowered = email.to_lowercase();
    for domain in DOT_INSENSITIVE_DOMAINS {
        let suffix = format!("@{domain}");
        if let Some(local) = lowered.strip_suffix(&suffix) {
            return format!("{}{}", local.replace('.', ""), suffix);
        }
    }
    lowered
}

/// Whether `candidate` matches `entry`: exact name, canonical email, and
/// case-insensitive login.
pub fn account_matches(candidate: &Account, entry: &Account) -> bool {
    candidate.name == entry.name
        && canonicalize_email(&candidate.email) == canonicalize_email(&entry.email)
        && candidate.login.eq_ignore_ascii_case(&entry.login)
}

/// Whether `candidate` matches any account yielded by `roster`.
pub fn matches_any<'a, I>(candidate: &Account, roster: I) -> bool
where
    I: IntoIterator<Item = &'a Account>,
{
    roster
        .into_iter()
        .any(|entry| account_matches(candidate, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_lowercases() {
        assert_eq!(canonicalize_email("Jane@Example.COM"), "jane@example.com");
    }

    #[test]
    fn test_canonicalize_strips_gmail_dots() {
        assert_eq!(
            canonicalize_email("a.b@gmail.com"),
            canonicalize_email("ab@gmail.com")
        );
        assert_eq!(
            canonicalize_email("First.Last@GoogleMail.com"),
            "firstlast@googlemail.com"
        );
    }

    #[test]
    fn test_canonicalize_keeps_dots_elsewhere() {
        assert_eq!(canonicalize_email("a.b@example.com"), "a.b@example.com");
        // Only the local part loses dots; the domain must be an exact gmail suffix.
        assert_eq!(canonicalize_email("a.b@notgmail.com"), "a.b@notgmail.com");
    }

    #[test]
    fn test_canonicalize_keeps_plus_suffix() {
        assert_eq!(
            canonicalize_email("a.b+cla@gmail.com"),
            "ab+cla@gmail.com"
        );
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        for email in [
            "",
            "no-at-sign",
            "A.B@Gmail.com",
            "x.y.z@googlemail.com",
            "Mixed.Case@Example.org",
            "@gmail.com",
        ] {
            let once = canonicalize_email(email);
            assert_eq!(canonicalize_email(&once), once, "input: {email:?}");
        }
    }

    #[test]
    fn test_match_is_case_insensitive_on_login() {
        let entry = Account::new("Jane Doe", "jane@example.com", "JaneDoe");
        for login in ["JaneDoe", "janedoe", "JANEDOE"] {
            let candidate = Account::new("Jane Doe", "jane@example.com", login);
            assert!(matches_any(&candidate, [&entry]), "login: {login}");
        }
    }

    #[test]
    fn test_match_is_case_sensitive_on_name() {
        let entry = Account::new("Jane Doe", "jane@example.com", "janedoe");
        let candidate = Account::new("jane doe", "jane@example.com", "janedoe");
        assert!(!account_matches(&candidate, &entry));
    }

    #[test]
    fn test_match_uses_canonical_email() {
        let entry = Account::new("Jane Doe", "jane.doe@gmail.com", "janedoe");
        let candidate = Account::new("Jane Doe", "JaneDoe@gmail.com", "janedoe");
        assert!(account_matches(&candidate, &entry));
    }

    #[test]
    fn test_match_any_empty_roster() {
        let candidate = Account::new("Jane Doe", "jane@example.com", "janedoe");
        assert!(!matches_any(&candidate, &[]));
    }

    #[test]
    fn test_incomplete_account() {
        assert!(Account::new("", "a@b.c", "x").is_incomplete());
        assert!(Account::new("A", "", "x").is_incomplete());
        assert!(Account::new("A", "a@b.c", "").is_incomplete());
        assert!(!Account::new("A", "a@b.c", "x").is_incomplete());
    }
}
