//! Weekly maintenance-window awareness (§4.4): "if `now` falls inside
//! one, the client refuses to dispatch and returns a distinct
//! 'maintenance' error without consuming a retry budget."

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// A single recurring weekly window, e.g. "Sunday 02:00-04:00".
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceWindow {
    pub weekday: Weekday,
    pub start_minute_of_day: u32,
    pub end_minute_of_day: u32,
}

impl MaintenanceWindow {
    fn contains(&self, now: DateTime<Utc>) -> bool {
        if now.weekday() != self.weekday {
            return false;
        }
        let minute_of_day = now.hour() * 60 + now.minute();
        (self.start_minute_of_day..self.end_minute_of_day).contains(&minute_of_day)
    }
}

/// The configured set of windows for one provider endpoint. Order is
/// not significant; windows are not expected to overlap.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceSchedule {
    windows: Vec<MaintenanceWindow>,
}

impl MaintenanceSchedule {
    pub fn new(windows: Vec<MaintenanceWindow>) -> Self {
        Self { windows }
    }

    /// Whether `now` falls inside any configured window.
    pub fn is_in_maintenance(&self, now: DateTime<Utc>) -> bool {
        self.windows.iter().any(|w| w.contains(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn detects_inside_and_outside_a_window() {
        let schedule = MaintenanceSchedule::new(vec![MaintenanceWindow {
            weekday: Weekday::Sun,
            start_minute_of_day: 2 * 60,
            end_minute_of_day: 4 * 60,
        }]);

        let inside = Utc.with_ymd_and_hms(2026, 8, 2, 3, 0, 0).unwrap(); // a Sunday
        let outside = Utc.with_ymd_and_hms(2026, 8, 2, 5, 0, 0).unwrap();
        let wrong_day = Utc.with_ymd_and_hms(2026, 8, 3, 3, 0, 0).unwrap(); // Monday

        assert!(schedule.is_in_maintenance(inside));
        assert!(!schedule.is_in_maintenance(outside));
        assert!(!schedule.is_in_maintenance(wrong_day));
    }

    #[test]
    fn empty_schedule_is_never_in_maintenance() {
        let schedule = MaintenanceSchedule::default();
        assert!(!schedule.is_in_maintenance(Utc::now()));
    }
}
