/*
Streak counters derived from completion events.
Module was independently written from HTTP / Axum for testing
*/

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{StreakKind, StreakRecord};

// Identifies one streak counter. Daily-kind streaks carry no task id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakKey {
    pub user_id: Uuid,
    pub kind: StreakKind,
    pub task_id: Option<Uuid>,
}

impl StreakKey {
    pub fn daily(user_id: Uuid) -> StreakKey {
        StreakKey {
            user_id,
            kind: StreakKind::Daily,
            task_id: None,
        }
    }

    pub fn task(user_id: Uuid, task_id: Uuid) -> StreakKey {
        StreakKey {
            user_id,
            kind: StreakKind::Task,
            task_id: Some(task_id),
        }
    }
}

// Fold one completion event (on calendar date `date`) into the record.
//
// Rules:
// - No record yet -> current = longest = 1
// - Exactly the next day -> current += 1
// - Same day again -> no-op (a second completion must not inflate the streak)
// - Gap of two or more days -> current resets to 1, last date advances
// - Event dated before the last completed date -> current resets to 1 but
//   the last date does NOT rewind; logged as an ordering anomaly
//
// longest_streak is folded as max(longest, current) and never decreases.
pub fn apply_completion(
    existing: Option<&StreakRecord>,
    key: &StreakKey,
    date: NaiveDate,
) -> StreakRecord {
    let Some(prev) = existing else {
        return StreakRecord {
            id: Uuid::new_v4(),
            user_id: key.user_id,
            kind: key.kind,
            task_id: key.task_id,
            current_streak: 1,
            longest_streak: 1,
            last_completed_date: Some(date),
        };
    };

    let mut rec = prev.clone();
    match rec.last_completed_date {
        Some(last) if last == date => return rec,
        Some(last) if last.succ_opt() == Some(date) => {
            rec.current_streak += 1;
            rec.last_completed_date = Some(date);
        }
        Some(last) if date < last => {
            tracing::warn!(
                user = %key.user_id,
                event_date = %date,
                last_completed = %last,
                "out-of-order completion event, streak reset without rewinding last date"
            );
            rec.current_streak = 1;
        }
        Some(_) => {
            rec.current_streak = 1;
            rec.last_completed_date = Some(date);
        }
        None => {
            rec.current_streak = 1;
            rec.last_completed_date = Some(date);
        }
    }
    rec.longest_streak = rec.longest_streak.max(rec.current_streak);
    rec
}

// Rebuild the record from the full completion-date history (ascending).
// Used for reversal: ad hoc decrement is unsafe once out-of-order events
// have been folded, so un-completing always replays.
pub fn replay(
    existing: Option<&StreakRecord>,
    key: &StreakKey,
    dates: &[NaiveDate],
) -> StreakRecord {
    let mut rec = StreakRecord {
        id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
        user_id: key.user_id,
        kind: key.kind,
        task_id: key.task_id,
        current_streak: 0,
        longest_streak: 0,
        last_completed_date: None,
    };
    for &d in dates {
        rec = apply_completion(Some(&rec), key, d);
    }
    rec
}
