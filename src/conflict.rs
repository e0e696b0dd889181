/*
Time-conflict detection for task create / update.
Module was independently written from HTTP / Axum for testing
*/

use chrono::NaiveTime;
use serde::Serialize;
use uuid::Uuid;

use crate::interval::Interval;
use crate::models::Task;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    Full,    // candidate entirely contains the existing interval
    Partial, // any other overlap
}

// One existing task the candidate window collides with.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictEntry {
    pub task_id: Uuid,
    pub title: String,
    pub start_time: NaiveTime,
    pub duration_min: i64,
    pub overlap: OverlapKind,
}

// Advisory check of a candidate window against a user's active tasks.
//
// Rules:
// - Only tasks owned by `user_id` are considered
// - The task being updated (`exclude_task_id`) is skipped
// - Completed tasks never conflict; they are historical, not blockers
// - Results are ordered by the existing task's start time ascending
pub fn find_conflicts(
    candidate: Interval,
    user_id: Uuid,
    tasks: &[Task],
    exclude_task_id: Option<Uuid>,
) -> Vec<ConflictEntry> {
    let mut conflicts: Vec<ConflictEntry> = tasks
        .iter()
        .filter(|t| t.user_id == user_id)
        .filter(|t| Some(t.id) != exclude_task_id)
        .filter(|t| !t.is_completed)
        .filter_map(|t| {
            let existing = Interval::from_start_duration(t.start_time, t.duration_min).ok()?;
            if !candidate.overlaps(&existing) {
                return None;
            }
            let overlap = if candidate.contains(&existing) {
                OverlapKind::Full
            } else {
                OverlapKind::Partial
            };
            Some(ConflictEntry {
                task_id: t.id,
                title: t.title.clone(),
                start_time: t.start_time,
                duration_min: t.duration_min,
                overlap,
            })
        })
        .collect();

    // stable sort keeps insertion order for equal start times
    conflicts.sort_by_key(|c| c.start_time);
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn task(user: Uuid, start: NaiveTime, duration_min: i64, done: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: user,
            title: "task".to_string(),
            category: None,
            start_time: start,
            duration_min,
            recurrence: None,
            priority: Priority::Medium,
            is_completed: done,
            completed_at: None,
            created_at: chrono::Local::now().fixed_offset(),
            notes: None,
        }
    }

    fn iv(start: NaiveTime, duration_min: i64) -> Interval {
        Interval::from_start_duration(start, duration_min).unwrap()
    }

    #[test]
    fn non_overlapping_tasks_produce_no_conflicts() {
        let user = Uuid::new_v4();
        let tasks = vec![task(user, t(11, 0), 30, false), task(user, t(7, 0), 60, false)];
        assert!(find_conflicts(iv(t(9, 0), 60), user, &tasks, None).is_empty());
    }

    #[test]
    fn contained_task_is_full_overlap() {
        // A at 09:00 for 60 min fully contains B at 09:30 for 30 min
        let user = Uuid::new_v4();
        let tasks = vec![task(user, t(9, 30), 30, false)];
        let found = find_conflicts(iv(t(9, 0), 60), user, &tasks, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].overlap, OverlapKind::Full);
    }

    #[test]
    fn interior_start_is_partial_overlap() {
        // C at 09:45 for 60 min against A at 09:00 for 60 min
        let user = Uuid::new_v4();
        let tasks = vec![task(user, t(9, 0), 60, false)];
        let found = find_conflicts(iv(t(9, 45), 60), user, &tasks, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].overlap, OverlapKind::Partial);
    }

    #[test]
    fn completed_tasks_never_conflict() {
        let user = Uuid::new_v4();
        let tasks = vec![task(user, t(9, 0), 60, true)];
        assert!(find_conflicts(iv(t(9, 0), 60), user, &tasks, None).is_empty());
    }

    #[test]
    fn other_users_tasks_are_ignored() {
        let user = Uuid::new_v4();
        let tasks = vec![task(Uuid::new_v4(), t(9, 0), 60, false)];
        assert!(find_conflicts(iv(t(9, 0), 60), user, &tasks, None).is_empty());
    }

    #[test]
    fn excluded_task_is_skipped_on_update() {
        let user = Uuid::new_v4();
        let existing = task(user, t(9, 0), 60, false);
        let id = existing.id;
        let tasks = vec![existing];
        assert!(find_conflicts(iv(t(9, 0), 60), user, &tasks, Some(id)).is_empty());
        assert_eq!(find_conflicts(iv(t(9, 0), 60), user, &tasks, None).len(), 1);
    }

    #[test]
    fn conflicts_are_ordered_by_start_time() {
        let user = Uuid::new_v4();
        let tasks = vec![
            task(user, t(10, 0), 30, false),
            task(user, t(9, 0), 30, false),
            task(user, t(9, 30), 30, false),
        ];
        let found = find_conflicts(iv(t(8, 0), 300), user, &tasks, None);
        let starts: Vec<NaiveTime> = found.iter().map(|c| c.start_time).collect();
        assert_eq!(starts, vec![t(9, 0), t(9, 30), t(10, 0)]);
        assert!(found.iter().all(|c| c.overlap == OverlapKind::Full));
    }
}
