//! Weekly time-window evaluation.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::models::TimePeriod;

/// How far forward `next_valid_time` scans before giving up.
const SCAN_LIMIT_DAYS: i64 = 366;

/// Whether `t` falls inside the period. A missing period is the explicit
/// "unrestricted" sentinel and is always valid.
pub fn is_time_valid(t: DateTime<Utc>, period: Option<&TimePeriod>) -> bool {
    let Some(period) = period else {
        return true;
    };

    let second = t.num_seconds_from_midnight();
    period.ranges_on(t.weekday()).iter().any(|range| range.start <= second && second < range.end)
}

/// The first moment at or after `t` that is valid in the period.
///
/// Scans forward day by day, bounded at a year. Returns `None` when the
/// period contains no ranges at all; an unrestricted (`None`) period returns
/// `t` itself.
pub fn next_valid_time(t: DateTime<Utc>, period: Option<&TimePeriod>) -> Option<DateTime<Utc>> {
    let Some(period) = period else {
        return Some(t);
    };

    if period.is_empty() {
        return None;
    }

    if is_time_valid(t, Some(period)) {
        return Some(t);
    }

    let midnight = t - Duration::seconds(t.num_seconds_from_midnight() as i64)
        - Duration::nanoseconds(t.timestamp_subsec_nanos() as i64);

    for offset in 0..=SCAN_LIMIT_DAYS {
        let day_start = midnight + Duration::days(offset);
        let mut earliest: Option<DateTime<Utc>> = None;

        for range in period.ranges_on(day_start.weekday()) {
            let start = day_start + Duration::seconds(range.start as i64);
            let end = day_start + Duration::seconds(range.end as i64);
            if end <= t {
                continue;
            }
            let candidate = if start < t { t } else { start };
            if earliest.map(|e| candidate < e).unwrap_or(true) {
                earliest = Some(candidate);
            }
        }

        if earliest.is_some() {
            return earliest;
        }
    }

    None
}
