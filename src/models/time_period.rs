//! Weekly time periods restricting when notifications may go out.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// A `[start, end)` range of seconds-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start, seconds after midnight.
    pub start: u32,
    /// Exclusive end, seconds after midnight.
    pub end: u32,
}

/// A named weekly schedule: one ordered range list per day, Sunday first.
///
/// An entity or contact referencing no period at all is unrestricted; that
/// sentinel is represented as `None` at the reference site, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Unique period name.
    pub name: String,
    /// Valid ranges for each day of the week, Sunday first.
    pub days: [Vec<TimeRange>; 7],
}

impl TimePeriod {
    /// The ranges valid on the given weekday.
    pub fn ranges_on(&self, weekday: Weekday) -> &[TimeRange] {
        &self.days[weekday.num_days_from_sunday() as usize]
    }

    /// Whether the period contains no ranges on any day. Such a period has
    /// no next valid time.
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|day| day.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_on_indexes_sunday_first() {
        let mut days: [Vec<TimeRange>; 7] = Default::default();
        days[0] = vec![TimeRange { start: 0, end: 60 }];
        days[1] = vec![TimeRange { start: 3600, end: 7200 }];
        let period = TimePeriod { name: "p".to_string(), days };

        assert_eq!(period.ranges_on(Weekday::Sun), &[TimeRange { start: 0, end: 60 }]);
        assert_eq!(period.ranges_on(Weekday::Mon), &[TimeRange { start: 3600, end: 7200 }]);
        assert!(period.ranges_on(Weekday::Tue).is_empty());
        assert!(!period.is_empty());
    }
}
