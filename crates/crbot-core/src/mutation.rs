//! Writes planned against a pull request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HostResult;
use crate::host::HostWriter;
use crate::labels::{ClaLabel, LabelPlan};
use crate::model::ReviewVerdict;
use crate::notify::Notification;

/// A single write against a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    AddLabel { label: ClaLabel },
    RemoveLabel { label: ClaLabel },
    Comment { body: String },
    Review { verdict: ReviewVerdict, body: String },
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::AddLabel { label } => write!(f, "add label [{label}]"),
            Mutation::RemoveLabel { label } => write!(f, "remove label [{label}]"),
            Mutation::Comment { .. } => f.write_str("comment"),
            Mutation::Review { verdict, .. } => write!(f, "{} review", verdict.as_event()),
        }
    }
}

/// Mutations for one pull request: label removals, label additions, then
/// the notification (if any).
pub fn plan_mutations(plan: &LabelPlan, notification: Option<Notification>) -> Vec<Mutation> {
    let mut mutations: Vec<Mutation> = plan
        .remove
        .iter()
        .map(|label| Mutation::RemoveLabel { label: *label })
        .chain(plan.add.iter().map(|label| Mutation::AddLabel { label: *label }))
        .collect();

    match notification {
        Some(Notification::Comment { body }) => mutations.push(Mutation::Comment { body }),
        Some(Notification::Review { verdict, body }) => {
            mutations.push(Mutation::Review { verdict, body })
        }
        None => {}
    }
    mutations
}

/// Carry out `mutation` through `writer`.
pub async fn apply_mutation(
    writer: &dyn HostWriter,
    org: &str,
    repo: &str,
    number: u64,
    mutation: &Mutation,
) -> HostResult<()> {
    match mutation {
        Mutation::AddLabel { label } => {
            writer
                .add_labels(org, repo, number, &[label.name().to_string()])
                .await
        }
        Mutation::RemoveLabel { label } => {
            writer.remove_label(org, repo, number, label.name()).await
        }
        Mutation::Comment { body } => writer.create_comment(org, repo, number, body).await,
        Mutation::Review { verdict, body } => {
            writer
                .create_review(org, repo, number, *verdict, body)
                .await
        }
    }
}
