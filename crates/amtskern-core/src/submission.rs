//! The submission hub entity and its state machine (§3, §4.5).

use crate::ids::{AccountId, SubmissionId, TenantId, UserId};
use crate::payload::SubmissionPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator for the six submission kinds (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Registration,
    Deregistration,
    Change,
    AnnualTaxForm,
    MonthlyContributionReport,
    TaxReturn,
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Registration => "registration",
            Self::Deregistration => "deregistration",
            Self::Change => "change",
            Self::AnnualTaxForm => "annual-tax-form",
            Self::MonthlyContributionReport => "monthly-contribution-report",
            Self::TaxReturn => "tax-return",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle status (§4.5). Transition validity is enforced by
/// [`SubmissionStatus::can_transition_to`], never by ad hoc checks
/// scattered through the engine — the closure property in §8.4 depends
/// on there being exactly one place that decides this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Validated,
    Submitted,
    Accepted,
    Rejected,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Validated => "validated",
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl SubmissionStatus {
    /// The state graph from §4.5, as data. `Rejected -> Validated` is
    /// included because `retry` may re-enter validated exactly once;
    /// the "exactly once" part is a row-level fact (has `retry` already
    /// been used), not something the status graph alone can express,
    /// so the engine enforces it separately (see `amtskern-submissions`).
    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, next),
            (Draft, Validated)
                | (Validated, Submitted)
                | (Submitted, Accepted)
                | (Submitted, Rejected)
                | (Rejected, Validated)
        )
    }

    /// Terminal states accept no further automatic transitions, though
    /// `Rejected` may still be re-entered via the user/job-initiated
    /// `retry` operation (§4.5).
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Accepted | SubmissionStatus::Rejected)
    }
}

/// Change categories (§4.5, fixed enumeration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ChangeCategory {
    Remuneration,
    WorkHours,
    Role,
    Grading,
    WorkLocation,
    CollectiveAgreement,
    ContributionGroup,
    Address,
    Bank,
    Name,
    Multi,
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Remuneration => "REMUNERATION",
            Self::WorkHours => "WORK-HOURS",
            Self::Role => "ROLE",
            Self::Grading => "GRADING",
            Self::WorkLocation => "WORK-LOCATION",
            Self::CollectiveAgreement => "COLLECTIVE-AGREEMENT",
            Self::ContributionGroup => "CONTRIBUTION-GROUP",
            Self::Address => "ADDRESS",
            Self::Bank => "BANK",
            Self::Name => "NAME",
            Self::Multi => "MULTI",
        };
        write!(f, "{s}")
    }
}

/// One `{field, old, new, category}` entry produced by change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
    pub category: ChangeCategory,
}

/// The full diff result of `detect-change` (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub changes: Vec<FieldChange>,
}

impl Changeset {
    /// `MULTI` if more than one category changed, else that category.
    /// Panics-free: an empty changeset has no label, callers must
    /// check `is_empty` first (an empty diff is "nothing changed",
    /// which is itself meaningful to the caller of `detect-change`).
    pub fn label(&self) -> Option<ChangeCategory> {
        let mut categories: Vec<ChangeCategory> =
            self.changes.iter().map(|c| c.category).collect();
        categories.sort_by_key(|c| format!("{c}"));
        categories.dedup();
        match categories.len() {
            0 => None,
            1 => Some(categories[0]),
            _ => Some(ChangeCategory::Multi),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The submission row (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub payload: SubmissionPayload,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserId,

    pub request_xml: Option<String>,
    pub response_xml: Option<String>,
    pub protocol_number: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,

    pub corrects_id: Option<SubmissionId>,
    pub is_correction: bool,
    /// Whether `retry` has already been used once to re-enter `validated`
    /// from `rejected`. Enforces the "exactly once" clause of §4.5.
    pub retried: bool,

    pub original_submission_id: Option<SubmissionId>,
}

impl Submission {
    pub fn kind(&self) -> SubmissionKind {
        self.payload.kind()
    }

    /// Invariant check (§3): `corrects_id` and `is_correction` agree.
    pub fn correction_linkage_is_consistent(&self) -> bool {
        self.corrects_id.is_some() == self.is_correction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_graph_matches_spec_4_5() {
        use SubmissionStatus::*;
        assert!(Draft.can_transition_to(Validated));
        assert!(Validated.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Accepted));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Validated));

        // No edge outside the graph in §4.5.
        assert!(!Draft.can_transition_to(Submitted));
        assert!(!Draft.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Validated));
        assert!(!Validated.can_transition_to(Draft));
        assert!(!Rejected.can_transition_to(Submitted));
    }

    #[test]
    fn changeset_label_is_multi_for_more_than_one_category() {
        let cs = Changeset {
            changes: vec![
                FieldChange {
                    field: "remuneration".into(),
                    old: "1000.00".into(),
                    new: "1100.00".into(),
                    category: ChangeCategory::Remuneration,
                },
                FieldChange {
                    field: "role".into(),
                    old: "clerk".into(),
                    new: "manager".into(),
                    category: ChangeCategory::Role,
                },
            ],
        };
        assert_eq!(cs.label(), Some(ChangeCategory::Multi));
    }

    #[test]
    fn changeset_label_is_single_category_when_only_one_changed() {
        let cs = Changeset {
            changes: vec![FieldChange {
                field: "role".into(),
                old: "clerk".into(),
                new: "manager".into(),
                category: ChangeCategory::Role,
            }],
        };
        assert_eq!(cs.label(), Some(ChangeCategory::Role));
    }
}
