//! # amtskern-core
//!
//! Foundational types shared by every other crate in the workspace:
//! tenant/account/submission/job identifiers, the kind-specific
//! submission payloads, integer-minor-unit money, and the shared
//! error hierarchy (§3, §7 of the core specification).
//!
//! This crate has no I/O. It is pure data plus the invariants that are
//! cheap to check on that data (state-graph membership, correction
//! linkage consistency). Everything that touches a wire, a database,
//! or a filesystem lives in a sibling crate.

pub mod account;
pub mod error;
pub mod ids;
pub mod job;
pub mod money;
pub mod payload;
pub mod submission;

pub use account::{AccountKind, AccountMetadata};
pub use error::{DomainError, FieldFinding, Severity, ValidationError};
pub use ids::{AccountId, JobId, LineItemId, SubmissionId, TenantId, UserId};
pub use job::{Job, JobKind, JobStatus};
pub use money::{Money, MoneyError};
pub use payload::{
    Address, AnnualTaxFormPayload, BankDetails, ContributionLineItem, EmploymentData,
    MonthlyContributionReportPayload, SubmissionPayload, TaxLineItem, TaxReturnPayload,
};
pub use submission::{ChangeCategory, Changeset, FieldChange, Submission, SubmissionKind, SubmissionStatus};
