//! # amtskern-deadlines
//!
//! Deadline computation and change detection (C7, §4.7): pure
//! calendar arithmetic plus field-level diffing, with no I/O — the
//! job scheduler in `amtskern-jobs` calls into this crate on a tick,
//! the submission engine calls into it for `detect-change`.

pub mod change_detection;
pub mod deadline;
pub mod period;

pub use change_detection::detect_change;
pub use deadline::{annual_deadline, annual_status, monthly_deadline, monthly_status, pending_annual_years, pending_monthly_periods, DeadlineStatus};
pub use period::Period;
