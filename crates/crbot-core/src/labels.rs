//! Enforcement labels and their reconciliation.
//!
//! [`reconcile`] compares the labels a verdict calls for with the labels a
//! pull request carries and returns only the differences. A label can only
//! be added if the repository defines it. Applying a plan and reconciling
//! again yields an empty plan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregator::PullRequestStatus;
use crate::model::Label;

pub const LABEL_CLA_YES: &str = "cla: yes";
pub const LABEL_CLA_NO: &str = "cla: no";
pub const LABEL_CLA_EXTERNAL: &str = "cla: external";

/// One of the three labels crbot manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaLabel {
    Signed,
    NotSigned,
    External,
}

impl ClaLabel {
    pub const ALL: [ClaLabel; 3] = [ClaLabel::Signed, ClaLabel::NotSigned, ClaLabel::External];

    pub fn name(&self) -> &'static str {
        match self {
            ClaLabel::Signed => LABEL_CLA_YES,
            ClaLabel::NotSigned => LABEL_CLA_NO,
            ClaLabel::External => LABEL_CLA_EXTERNAL,
        }
    }

    /// The enforcement label `name` refers to, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|label| label.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ClaLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A subset of the enforcement labels.
///
/// Used both for the labels a repository defines and the labels a pull
/// request carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaLabelSet {
    pub signed: bool,
    pub not_signed: bool,
    pub external: bool,
}

impl ClaLabelSet {
    pub fn all() -> Self {
        Self {
            signed: true,
            not_signed: true,
            external: true,
        }
    }

    pub fn of(labels: &[ClaLabel]) -> Self {
        let mut set = Self::default();
        for label in labels {
            set.set(*label, true);
        }
        set
    }

    /// Enforcement labels among `labels`; others are ignored.
    pub fn from_labels(labels: &[Label]) -> Self {
        let mut set = Self::default();
        for label in labels {
            if let Some(cla) = ClaLabel::from_name(&label.name) {
                set.set(cla, true);
            }
        }
        set
    }

    pub fn contains(&self, label: ClaLabel) -> bool {
        match label {
            ClaLabel::Signed => self.signed,
            ClaLabel::NotSigned => self.not_signed,
            ClaLabel::External => self.external,
        }
    }

    pub fn set(&mut self, label: ClaLabel, present: bool) {
        match label {
            ClaLabel::Signed => self.signed = present,
            ClaLabel::NotSigned => self.not_signed = present,
            ClaLabel::External => self.external = present,
        }
    }

    /// The set after `plan` has been carried out.
    pub fn apply(mut self, plan: &LabelPlan) -> Self {
        for label in &plan.remove {
            self.set(*label, false);
        }
        for label in &plan.add {
            self.set(*label, true);
        }
        self
    }
}

/// Labels to add and remove on one pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPlan {
    pub add: Vec<ClaLabel>,
    pub remove: Vec<ClaLabel>,
}

impl LabelPlan {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    pub fn adds(&self, label: ClaLabel) -> bool {
        self.add.contains(&label)
    }

    pub fn removes(&self, label: ClaLabel) -> bool {
        self.remove.contains(&label)
    }
}

/// The single enforcement label a verdict calls for.
pub fn desired_label(status: &PullRequestStatus) -> ClaLabel {
    if status.external {
        ClaLabel::External
    } else if status.compliant {
        ClaLabel::Signed
    } else {
        ClaLabel::NotSigned
    }
}

/// Minimal label changes moving `observed` to the state `status` calls for.
///
/// The desired label is added when missing and defined on the repository
/// (`supported`); the two other enforcement labels are removed when present.
pub fn reconcile(
    status: &PullRequestStatus,
    supported: ClaLabelSet,
    observed: ClaLabelSet,
) -> LabelPlan {
    let desired = desired_label(status);
    let mut plan = LabelPlan::default();

    if !observed.contains(desired) && supported.contains(desired) {
        plan.add.push(desired);
    }
    for label in ClaLabel::ALL {
        if label != desired && observed.contains(label) {
            plan.remove.push(label);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compliant() -> PullRequestStatus {
        PullRequestStatus::default()
    }

    fn non_compliant() -> PullRequestStatus {
        PullRequestStatus {
            compliant: false,
            non_compliance_reason: "Committer of one or more commits...".to_string(),
            ..Default::default()
        }
    }

    fn external() -> PullRequestStatus {
        PullRequestStatus {
            external: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_label_names_match_case_insensitively() {
        assert_eq!(ClaLabel::from_name("CLA: Yes"), Some(ClaLabel::Signed));
        assert_eq!(ClaLabel::from_name("cla: no"), Some(ClaLabel::NotSigned));
        assert_eq!(ClaLabel::from_name("bug"), None);
    }

    #[test]
    fn test_from_labels_ignores_unrelated() {
        let labels = vec![Label::new("bug"), Label::new("cla: external")];
        assert_eq!(
            ClaLabelSet::from_labels(&labels),
            ClaLabelSet::of(&[ClaLabel::External])
        );
    }

    #[test]
    fn test_compliant_adds_signed_and_removes_others() {
        let observed = ClaLabelSet::of(&[ClaLabel::NotSigned, ClaLabel::External]);
        let plan = reconcile(&compliant(), ClaLabelSet::all(), observed);
        assert_eq!(plan.add, vec![ClaLabel::Signed]);
        assert_eq!(plan.remove, vec![ClaLabel::NotSigned, ClaLabel::External]);
    }

    #[test]
    fn test_compliant_already_labelled_is_noop() {
        let observed = ClaLabelSet::of(&[ClaLabel::Signed]);
        assert!(reconcile(&compliant(), ClaLabelSet::all(), observed).is_empty());
    }

    #[test]
    fn test_non_compliant_swaps_signed_for_not_signed() {
        let observed = ClaLabelSet::of(&[ClaLabel::Signed]);
        let plan = reconcile(&non_compliant(), ClaLabelSet::all(), observed);
        assert_eq!(plan.add, vec![ClaLabel::NotSigned]);
        assert_eq!(plan.remove, vec![ClaLabel::Signed]);
    }

    #[test]
    fn test_external_only_manages_external_marker() {
        let observed = ClaLabelSet::of(&[ClaLabel::Signed, ClaLabel::NotSigned]);
        let plan = reconcile(&external(), ClaLabelSet::all(), observed);
        assert_eq!(plan.add, vec![ClaLabel::External]);
        assert_eq!(plan.remove, vec![ClaLabel::Signed, ClaLabel::NotSigned]);
    }

    #[test]
    fn test_undefined_label_is_not_added_but_stale_ones_are_removed() {
        let supported = ClaLabelSet::of(&[ClaLabel::Signed]);
        let observed = ClaLabelSet::of(&[ClaLabel::Signed]);
        let plan = reconcile(&non_compliant(), supported, observed);
        assert!(plan.add.is_empty());
        assert_eq!(plan.remove, vec![ClaLabel::Signed]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let statuses = [compliant(), non_compliant(), external()];
        let supports = [
            ClaLabelSet::all(),
            ClaLabelSet::of(&[ClaLabel::Signed, ClaLabel::NotSigned]),
            ClaLabelSet::default(),
        ];
        for status in &statuses {
            for supported in supports {
                for bits in 0..8u8 {
                    let observed = ClaLabelSet {
                        signed: bits & 1 != 0,
                        not_signed: bits & 2 != 0,
                        external: bits & 4 != 0,
                    };
                    let first = reconcile(status, supported, observed);
                    let after = observed.apply(&first);
                    let second = reconcile(status, supported, after);
                    assert!(second.is_empty(), "{status:?} {supported:?} {observed:?}");
                }
            }
        }
    }
}
