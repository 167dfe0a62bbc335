//! Deadline computation (C7, §4.7) and the pending-period backlog.

use chrono::{Datelike, NaiveDate};

use crate::period::Period;

/// How soon before a deadline it is reported as urgent (§4.7).
const MONTHLY_URGENCY_WINDOW_DAYS: i64 = 3;
const ANNUAL_URGENCY_WINDOW_DAYS: i64 = 7;

/// How many years back the annual backlog looks before a period is no
/// longer considered pending (§4.7: "only if the deadline is within
/// the last five years").
const ANNUAL_BACKLOG_YEARS: i32 = 5;

/// `is_overdue`/`is_urgent` for a single deadline, evaluated against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineStatus {
    pub deadline: NaiveDate,
    pub days_remaining: i64,
    pub is_overdue: bool,
    pub is_urgent: bool,
}

fn status_for(deadline: NaiveDate, now: NaiveDate, urgency_window_days: i64) -> DeadlineStatus {
    let days_remaining = (deadline - now).num_days();
    DeadlineStatus {
        deadline,
        days_remaining,
        is_overdue: now > deadline,
        is_urgent: days_remaining > 0 && days_remaining <= urgency_window_days,
    }
}

/// Monthly contribution-report deadline (§4.7): the 15th of the month
/// following `period`, local-time end-of-day (represented here as the
/// calendar date; callers attach their own local end-of-day time).
pub fn monthly_deadline(period: Period) -> NaiveDate {
    let following = period.next();
    NaiveDate::from_ymd_opt(following.year, following.month, 15).expect("the 15th exists in every month")
}

pub fn monthly_status(period: Period, now: NaiveDate) -> DeadlineStatus {
    status_for(monthly_deadline(period), now, MONTHLY_URGENCY_WINDOW_DAYS)
}

/// Annual tax-form deadline (§4.7): the last day of February of the
/// year following `reporting_year`, with leap-year handling (29 Feb).
pub fn annual_deadline(reporting_year: i32) -> NaiveDate {
    let due_year = reporting_year + 1;
    last_day_of_february(due_year)
}

fn last_day_of_february(year: i32) -> NaiveDate {
    // The day before March 1st is always the last day of February,
    // leap or not — simpler and less error-prone than a leap-year
    // branch that hardcodes 28 vs. 29.
    NaiveDate::from_ymd_opt(year, 3, 1)
        .expect("March 1st always exists")
        .pred_opt()
        .expect("the day before March 1st always exists")
}

pub fn annual_status(reporting_year: i32, now: NaiveDate) -> DeadlineStatus {
    status_for(annual_deadline(reporting_year), now, ANNUAL_URGENCY_WINDOW_DAYS)
}

/// Ordered list of monthly periods still due: everything after
/// `last_submitted` (exclusive) up to but excluding `current` (§4.7).
/// If no period has ever been submitted, the caller is expected to
/// pass the tenant's employment-start period as `last_submitted`.
pub fn pending_monthly_periods(last_submitted: Period, current: Period) -> Vec<Period> {
    let mut periods = Vec::new();
    let mut cursor = last_submitted.next();
    while cursor < current {
        periods.push(cursor);
        cursor = cursor.next();
    }
    periods
}

/// Ordered list of reporting years with an annual form still due: every
/// year after `last_submitted_year` (exclusive) up to `current_year -
/// 1` (inclusive), bounded to the last [`ANNUAL_BACKLOG_YEARS`] years
/// so a long-dormant subject doesn't generate an unbounded backlog.
pub fn pending_annual_years(last_submitted_year: Option<i32>, current_year: i32) -> Vec<i32> {
    let latest_due = current_year - 1;
    let earliest_due = current_year - ANNUAL_BACKLOG_YEARS;
    let start = match last_submitted_year {
        Some(y) => (y + 1).max(earliest_due),
        None => earliest_due,
    };
    (start..=latest_due).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Testable property #8 (§8): the monthly deadline is the 15th of
    /// the following month.
    #[test]
    fn monthly_deadline_is_15th_of_following_month() {
        assert_eq!(monthly_deadline(Period::new(2024, 11)), NaiveDate::from_ymd_opt(2024, 12, 15).unwrap());
        assert_eq!(monthly_deadline(Period::new(2024, 12)), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    /// Testable property #8 (§8): the annual deadline lands on the
    /// 28th, or the 29th in a leap year.
    #[test]
    fn annual_deadline_handles_leap_years() {
        assert_eq!(annual_deadline(2023), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(annual_deadline(2024), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn overdue_and_urgent_flags() {
        let deadline = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        let overdue = status_for(deadline, NaiveDate::from_ymd_opt(2024, 12, 16).unwrap(), MONTHLY_URGENCY_WINDOW_DAYS);
        assert!(overdue.is_overdue);
        assert!(!overdue.is_urgent);

        let urgent = status_for(deadline, NaiveDate::from_ymd_opt(2024, 12, 13).unwrap(), MONTHLY_URGENCY_WINDOW_DAYS);
        assert!(!urgent.is_overdue);
        assert!(urgent.is_urgent);

        let comfortable = status_for(deadline, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(), MONTHLY_URGENCY_WINDOW_DAYS);
        assert!(!comfortable.is_overdue);
        assert!(!comfortable.is_urgent);
    }

    #[test]
    fn pending_monthly_periods_stops_before_current() {
        let pending = pending_monthly_periods(Period::new(2024, 8), Period::new(2024, 11));
        assert_eq!(pending, vec![Period::new(2024, 9), Period::new(2024, 10)]);
    }

    #[test]
    fn pending_annual_years_bounded_to_five_years_back() {
        let pending = pending_annual_years(None, 2026);
        assert_eq!(pending, vec![2021, 2022, 2023, 2024, 2025]);
    }

    #[test]
    fn pending_annual_years_starts_after_last_submitted() {
        let pending = pending_annual_years(Some(2023), 2026);
        assert_eq!(pending, vec![2024, 2025]);
    }
}
