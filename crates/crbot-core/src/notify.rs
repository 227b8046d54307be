//! Comment and review notifications that accompany a verdict.
//!
//! Two policies exist and exactly one is active per run:
//! - [`NotificationPolicy::CommentOnChange`]: comment with the reason only
//!   when the pull request newly becomes labelled as not signed.
//! - [`NotificationPolicy::ReviewEveryRun`]: submit an approve or
//!   request-changes review on every evaluation.
//!
//! Externally managed pull requests never get a notification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregator::PullRequestStatus;
use crate::error::ConfigError;
use crate::labels::{ClaLabel, LabelPlan};
use crate::model::ReviewVerdict;

pub const APPROVE_BODY: &str =
    "All commit authors and committers are listed as CLA signers.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPolicy {
    #[serde(rename = "comment")]
    CommentOnChange,
    #[default]
    #[serde(rename = "review")]
    ReviewEveryRun,
}

impl NotificationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPolicy::CommentOnChange => "comment",
            NotificationPolicy::ReviewEveryRun => "review",
        }
    }
}

impl fmt::Display for NotificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comment" => Ok(NotificationPolicy::CommentOnChange),
            "review" => Ok(NotificationPolicy::ReviewEveryRun),
            other => Err(ConfigError::Invalid {
                field: "notification".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// A message to post on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Comment { body: String },
    Review { verdict: ReviewVerdict, body: String },
}

/// Comment body for a pull request that failed the CLA check.
pub fn render_comment(reason: &str) -> String {
    format!(
        "{reason}\n\nThis pull request cannot be accepted until every commit author and \
         committer is covered by a Contributor License Agreement."
    )
}

/// The notification `policy` calls for, given the verdict and the label
/// changes planned for this run.
pub fn notification_for(
    policy: NotificationPolicy,
    status: &PullRequestStatus,
    plan: &LabelPlan,
) -> Option<Notification> {
    if status.external {
        return None;
    }

    match policy {
        NotificationPolicy::CommentOnChange => {
            let transitioned =
                plan.adds(ClaLabel::NotSigned) || plan.removes(ClaLabel::Signed);
            (!status.compliant && transitioned).then(|| Notification::Comment {
                body: render_comment(&status.non_compliance_reason),
            })
        }
        NotificationPolicy::ReviewEveryRun => {
            let notification = if status.compliant {
                Notification::Review {
                    verdict: ReviewVerdict::Approve,
                    body: APPROVE_BODY.to_string(),
                }
            } else {
                Notification::Review {
                    verdict: ReviewVerdict::RequestChanges,
                    body: status.non_compliance_reason.clone(),
                }
            };
            Some(notification)
        }
    }
}
