/*
Minute-resolution time intervals.
Module was independently written from HTTP / Axum for testing
*/

use chrono::{NaiveTime, Timelike};

use crate::error::ValidationError;

// Half-open [start_min, end_min) on a flat 0..N minute line.
// end_min may exceed 1440: a task starting 23:30 for 90 minutes ends at
// 1590 and only conflict-checks against other same-day tasks on the same
// unwrapped scale. There is no midnight wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start_min: i64,
    pub end_min: i64,
}

fn minute_of_day(t: NaiveTime) -> i64 {
    (t.hour() * 60 + t.minute()) as i64
}

impl Interval {
    /// Normalize a (start time-of-day, duration) pair. Duration must be
    /// positive; seconds on the start time are ignored.
    pub fn from_start_duration(
        start: NaiveTime,
        duration_min: i64,
    ) -> Result<Interval, ValidationError> {
        if duration_min <= 0 {
            return Err(ValidationError::NonPositiveDuration(duration_min));
        }
        let start_min = minute_of_day(start);
        Ok(Interval {
            start_min,
            end_min: start_min + duration_min,
        })
    }

    /// Normalize a (start, end) pair. End must fall strictly after start.
    pub fn from_bounds(start: NaiveTime, end: NaiveTime) -> Result<Interval, ValidationError> {
        let start_min = minute_of_day(start);
        let end_min = minute_of_day(end);
        if end_min <= start_min {
            return Err(ValidationError::EndNotAfterStart);
        }
        Ok(Interval { start_min, end_min })
    }

    // [a,b) and [c,d) overlap iff a < d and c < b
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start_min <= other.start_min && self.end_min >= other.end_min
    }

    pub fn duration_min(&self) -> i64 {
        self.end_min - self.start_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn start_duration_normalizes_to_minutes() {
        let iv = Interval::from_start_duration(t(9, 0), 60).unwrap();
        assert_eq!(iv.start_min, 540);
        assert_eq!(iv.end_min, 600);
        assert_eq!(iv.duration_min(), 60);
    }

    #[test]
    fn crossing_midnight_does_not_wrap() {
        let iv = Interval::from_start_duration(t(23, 30), 90).unwrap();
        assert_eq!(iv.start_min, 1410);
        assert_eq!(iv.end_min, 1590);
    }

    #[test]
    fn non_positive_duration_rejected() {
        assert_eq!(
            Interval::from_start_duration(t(9, 0), 0),
            Err(ValidationError::NonPositiveDuration(0))
        );
        assert_eq!(
            Interval::from_start_duration(t(9, 0), -15),
            Err(ValidationError::NonPositiveDuration(-15))
        );
    }

    #[test]
    fn bounds_require_end_after_start() {
        assert!(Interval::from_bounds(t(9, 0), t(10, 0)).is_ok());
        assert_eq!(
            Interval::from_bounds(t(10, 0), t(10, 0)),
            Err(ValidationError::EndNotAfterStart)
        );
        assert_eq!(
            Interval::from_bounds(t(10, 0), t(9, 0)),
            Err(ValidationError::EndNotAfterStart)
        );
    }

    #[test]
    fn half_open_intervals_touching_do_not_overlap() {
        let a = Interval::from_start_duration(t(9, 0), 60).unwrap();
        let b = Interval::from_start_duration(t(10, 0), 30).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn overlap_and_containment() {
        let a = Interval::from_start_duration(t(9, 0), 60).unwrap();
        let b = Interval::from_start_duration(t(9, 30), 30).unwrap();
        let c = Interval::from_start_duration(t(9, 45), 60).unwrap();
        assert!(a.overlaps(&b));
        assert!(a.contains(&b));
        assert!(a.overlaps(&c));
        assert!(!a.contains(&c));
    }
}
