//! # amtskern-validator
//!
//! Pure, stateless domain validation (C2 of the core specification).
//! Every function here is a plain computation over already-loaded data
//! — no I/O, no clock reads beyond what callers pass in. Suspension
//! happens only at I/O boundaries elsewhere in the workspace; this
//! crate has none, by design (§5).

pub mod amount;
pub mod contribution_group;
pub mod sv_number;
pub mod submission;

pub use amount::{check_contribution_base, clamp_to_maximum_base, AmountWarning, GERINGFUEGIG_THRESHOLD, MAXIMUM_CONTRIBUTION_BASE};
pub use contribution_group::{validate_contribution_group, UnknownContributionGroup, KNOWN_CONTRIBUTION_GROUPS};
pub use submission::validate_payload;
pub use sv_number::{SvNumber, SvNumberError};
