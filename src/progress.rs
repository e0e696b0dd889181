/*
Daily progress aggregation and weekly / monthly rollups.
Module was independently written from HTTP / Axum for testing
*/

use chrono::{Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::interval::Interval;
use crate::models::{ProgressRecord, ScheduleInstance, ScheduleStatus};

// Recompute the day's aggregate from scratch. Idempotent: the same inputs
// always produce the same counters, and an existing record keeps its id.
//
// total_time_minutes counts completed instances only.
pub fn recompute_day(
    existing: Option<&ProgressRecord>,
    user_id: Uuid,
    date: NaiveDate,
    instances: &[ScheduleInstance],
) -> ProgressRecord {
    let days: Vec<&ScheduleInstance> = instances
        .iter()
        .filter(|s| s.user_id == user_id && s.date == date)
        .collect();

    let total_tasks = days.len() as u32;
    let completed: Vec<&&ScheduleInstance> = days
        .iter()
        .filter(|s| s.status == ScheduleStatus::Completed)
        .collect();
    let completed_tasks = completed.len() as u32;

    let completion_rate = if total_tasks > 0 {
        completed_tasks as f64 / total_tasks as f64
    } else {
        0.0
    };

    let total_time_minutes = completed
        .iter()
        .filter_map(|s| Interval::from_bounds(s.start_time, s.end_time).ok())
        .map(|iv| iv.duration_min())
        .sum();

    ProgressRecord {
        id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
        user_id,
        date,
        total_tasks,
        completed_tasks,
        completion_rate,
        total_time_minutes,
    }
}

// Rollup over a fixed window of daily records.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub average_completion_rate: f64,
    pub total_time_minutes: i64,
}

// Roll `days` daily records ending at `end_date` (inclusive) into one
// summary. A date with no stored record counts as zero activity rather
// than being excluded, so sparse data does not skew the average.
pub fn rollup(
    user_id: Uuid,
    end_date: NaiveDate,
    days: u32,
    records: &[ProgressRecord],
) -> ProgressSummary {
    debug_assert!(days > 0);
    let start_date = end_date
        .checked_sub_days(Days::new(days as u64 - 1))
        .unwrap_or(end_date);

    let window: Vec<&ProgressRecord> = records
        .iter()
        .filter(|r| r.user_id == user_id && r.date >= start_date && r.date <= end_date)
        .collect();

    let total_tasks = window.iter().map(|r| r.total_tasks).sum();
    let completed_tasks = window.iter().map(|r| r.completed_tasks).sum();
    let total_time_minutes = window.iter().map(|r| r.total_time_minutes).sum();
    let rate_sum: f64 = window.iter().map(|r| r.completion_rate).sum();

    ProgressSummary {
        start_date,
        end_date,
        days,
        total_tasks,
        completed_tasks,
        // missing days contribute 0.0, so divide by the window length
        average_completion_rate: rate_sum / days as f64,
        total_time_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn instance(
        user: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        status: ScheduleStatus,
    ) -> ScheduleInstance {
        ScheduleInstance {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            user_id: user,
            date,
            start_time: start,
            end_time: end,
            status,
            completed_at: None,
            notes: None,
        }
    }

    fn daily_record(user: Uuid, date: NaiveDate, rate: f64, minutes: i64) -> ProgressRecord {
        ProgressRecord {
            id: Uuid::new_v4(),
            user_id: user,
            date,
            total_tasks: 2,
            completed_tasks: 1,
            completion_rate: rate,
            total_time_minutes: minutes,
        }
    }

    #[test]
    fn empty_day_yields_zero_rate() {
        let user = Uuid::new_v4();
        let rec = recompute_day(None, user, d(1), &[]);
        assert_eq!(rec.total_tasks, 0);
        assert_eq!(rec.completed_tasks, 0);
        assert_eq!(rec.completion_rate, 0.0);
        assert_eq!(rec.total_time_minutes, 0);
    }

    #[test]
    fn counts_and_rate_come_from_the_days_instances() {
        let user = Uuid::new_v4();
        let instances = vec![
            instance(user, d(1), t(9, 0), t(10, 0), ScheduleStatus::Completed),
            instance(user, d(1), t(10, 0), t(10, 30), ScheduleStatus::Completed),
            instance(user, d(1), t(11, 0), t(12, 0), ScheduleStatus::Pending),
            instance(user, d(1), t(13, 0), t(13, 30), ScheduleStatus::Skipped),
            // other date and other user must not count
            instance(user, d(2), t(9, 0), t(10, 0), ScheduleStatus::Completed),
            instance(Uuid::new_v4(), d(1), t(9, 0), t(10, 0), ScheduleStatus::Completed),
        ];
        let rec = recompute_day(None, user, d(1), &instances);
        assert_eq!(rec.total_tasks, 4);
        assert_eq!(rec.completed_tasks, 2);
        assert_eq!(rec.completion_rate, 0.5);
        // only completed instances contribute minutes: 60 + 30
        assert_eq!(rec.total_time_minutes, 90);
    }

    #[test]
    fn rounded_rate_is_two_decimals_and_storage_full_precision() {
        let user = Uuid::new_v4();
        let instances = vec![
            instance(user, d(1), t(9, 0), t(10, 0), ScheduleStatus::Completed),
            instance(user, d(1), t(10, 0), t(11, 0), ScheduleStatus::Pending),
            instance(user, d(1), t(11, 0), t(12, 0), ScheduleStatus::Pending),
        ];
        let rec = recompute_day(None, user, d(1), &instances);
        assert_eq!(rec.completion_rate, 1.0 / 3.0);
        assert_eq!(rec.rounded_rate(), 0.33);
    }

    #[test]
    fn recompute_is_idempotent_and_keeps_identity() {
        let user = Uuid::new_v4();
        let instances = vec![instance(user, d(1), t(9, 0), t(10, 0), ScheduleStatus::Completed)];
        let first = recompute_day(None, user, d(1), &instances);
        let second = recompute_day(Some(&first), user, d(1), &instances);
        assert_eq!(first.id, second.id);
        assert_eq!(first.total_tasks, second.total_tasks);
        assert_eq!(first.completed_tasks, second.completed_tasks);
        assert_eq!(first.completion_rate, second.completion_rate);
        assert_eq!(first.total_time_minutes, second.total_time_minutes);
    }

    #[test]
    fn rollup_treats_missing_days_as_zero_activity() {
        let user = Uuid::new_v4();
        // 4 of 7 days present
        let sparse = vec![
            daily_record(user, d(1), 1.0, 60),
            daily_record(user, d(2), 0.5, 30),
            daily_record(user, d(4), 1.0, 45),
            daily_record(user, d(7), 0.5, 15),
        ];
        // same window with explicit zero records for the gaps
        let mut dense = sparse.clone();
        dense.push(daily_record(user, d(3), 0.0, 0));
        dense.push(daily_record(user, d(5), 0.0, 0));
        dense.push(daily_record(user, d(6), 0.0, 0));

        let a = rollup(user, d(7), 7, &sparse);
        let b = rollup(user, d(7), 7, &dense);
        assert_eq!(a.average_completion_rate, b.average_completion_rate);
        assert_eq!(a.total_time_minutes, b.total_time_minutes);
        assert_eq!(a.average_completion_rate, 3.0 / 7.0);
        assert_eq!(a.total_time_minutes, 150);
    }

    #[test]
    fn rollup_window_excludes_outside_dates_and_other_users() {
        let user = Uuid::new_v4();
        let records = vec![
            daily_record(user, d(1), 1.0, 60),   // before the window
            daily_record(user, d(2), 1.0, 60),
            daily_record(user, d(8), 0.5, 30),
            daily_record(Uuid::new_v4(), d(5), 1.0, 60),
        ];
        let summary = rollup(user, d(8), 7, &records);
        assert_eq!(summary.start_date, d(2));
        assert_eq!(summary.end_date, d(8));
        assert_eq!(summary.total_time_minutes, 90);
        assert_eq!(summary.average_completion_rate, 1.5 / 7.0);
    }
}
