//! The CLA signer roster.
//!
//! Loaded once per run (see [`crate::config::load_cla_signers`]) and only
//! read afterwards. Every section is optional in the file and defaults to
//! empty.

use serde::{Deserialize, Serialize};

use crate::account::Account;

/// A legal entity whose listed people are covered by a corporate CLA.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
    /// Informational only; never used for matching.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default)]
    pub people: Vec<Account>,
}

/// Identities whose CLA is tracked by a different process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalClaSigners {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people: Vec<Account>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bots: Vec<Account>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<Company>,
}

impl ExternalClaSigners {
    /// Every account in the section: people, bots, then company people.
    pub fn all_accounts(&self) -> impl Iterator<Item = &Account> {
        self.people
            .iter()
            .chain(self.bots.iter())
            .chain(self.companies.iter().flat_map(|c| c.people.iter()))
    }
}

/// The roster of CLA signers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaSigners {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people: Vec<Account>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bots: Vec<Account>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalClaSigners>,
}

impl ClaSigners {
    fn company_people(&self) -> impl Iterator<Item = &Account> {
        self.companies.iter().flat_map(|c| c.people.iter())
    }

    /// Accounts allowed to author commits: people and company people.
    pub fn authors(&self) -> impl Iterator<Item = &Account> {
        self.people.iter().chain(self.company_people())
    }

    /// Accounts allowed to commit: people, bots, and company people.
    pub fn committers(&self) -> impl Iterator<Item = &Account> {
        self.people
            .iter()
            .chain(self.bots.iter())
            .chain(self.company_people())
    }

    /// Every account in the main (non-external) roster.
    pub fn all_accounts(&self) -> impl Iterator<Item = &Account> {
        self.committers()
    }

    /// Number of accounts in the main roster, for logging.
    pub fn len(&self) -> usize {
        self.all_accounts().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> ClaSigners {
        ClaSigners {
            people: vec![Account::new("Person", "person@example.com", "person")],
            bots: vec![Account::new("Bot", "bot@example.com", "bot")],
            companies: vec![Company {
                name: "Acme".to_string(),
                domains: vec!["acme.example".to_string()],
                people: vec![Account::new("Employee", "emp@acme.example", "emp")],
            }],
            external: None,
        }
    }

    fn logins<'a>(accounts: impl Iterator<Item = &'a Account>) -> Vec<&'a str> {
        accounts.map(|a| a.login.as_str()).collect()
    }

    #[test]
    fn test_authors_exclude_bots() {
        assert_eq!(logins(roster().authors()), vec!["person", "emp"]);
    }

    #[test]
    fn test_committers_include_bots() {
        assert_eq!(logins(roster().committers()), vec!["person", "bot", "emp"]);
    }

    #[test]
    fn test_len_counts_company_people() {
        assert_eq!(roster().len(), 3);
        assert!(ClaSigners::default().is_empty());
    }
}
