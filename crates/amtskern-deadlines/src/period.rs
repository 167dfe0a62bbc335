//! Reporting-period arithmetic shared by the deadline calculators.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One monthly reporting period, e.g. November 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// The period immediately following this one.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Period::new(self.year + 1, 1)
        } else {
            Period::new(self.year, self.month + 1)
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Period::new(date.year(), date.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_rolls_over_the_year() {
        assert_eq!(Period::new(2024, 12).next(), Period::new(2025, 1));
    }

    #[test]
    fn next_within_the_same_year() {
        assert_eq!(Period::new(2024, 11).next(), Period::new(2024, 12));
    }
}
