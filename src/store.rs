use std::{fs, io, path::Path};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Db, ProgressRecord, ScheduleInstance, ScheduleStatus, StreakKind, StreakRecord, Task};
use crate::streak::StreakKey;

pub const DEFAULT_DB_PATH: &str = "data/db.json";

// A missing file is an empty database, not an error.
pub fn load_db(path: &Path) -> io::Result<Db> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Db::default()),
        Err(e) => return Err(e),
    };
    let db: Db =
        serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(db)
}

pub fn save_db(path: &Path, db: &Db) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(db)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp_path, text)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

// Query seams used by the handlers. The core logic never touches the
// store directly; it receives these slices and returns new records.
impl Db {
    pub fn tasks_for_user(&self, user_id: Uuid) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.user_id == user_id).collect()
    }

    pub fn task_mut(&mut self, id: Uuid, user_id: Uuid) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
    }

    pub fn instances_on(&self, user_id: Uuid, date: NaiveDate) -> Vec<&ScheduleInstance> {
        self.schedules
            .iter()
            .filter(|s| s.user_id == user_id && s.date == date)
            .collect()
    }

    pub fn instance_mut(&mut self, id: Uuid, user_id: Uuid) -> Option<&mut ScheduleInstance> {
        self.schedules
            .iter_mut()
            .find(|s| s.id == id && s.user_id == user_id)
    }

    /// Ascending, de-duplicated completion dates for a streak key.
    /// Daily-kind: dates with at least one completed instance for the user.
    /// Task-kind: dates on which that task's instances were completed.
    pub fn completion_dates(&self, key: &StreakKey) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .schedules
            .iter()
            .filter(|s| s.user_id == key.user_id && s.status == ScheduleStatus::Completed)
            .filter(|s| match key.kind {
                StreakKind::Daily => true,
                StreakKind::Task => Some(s.task_id) == key.task_id,
            })
            .map(|s| s.date)
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn streaks_for_user(&self, user_id: Uuid) -> Vec<&StreakRecord> {
        self.streaks
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    pub fn streak_for(&self, key: &StreakKey) -> Option<&StreakRecord> {
        self.streaks
            .iter()
            .find(|r| r.user_id == key.user_id && r.kind == key.kind && r.task_id == key.task_id)
    }

    pub fn upsert_streak(&mut self, record: StreakRecord) {
        match self.streaks.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => self.streaks.push(record),
        }
    }

    pub fn progress_for(&self, user_id: Uuid, date: NaiveDate) -> Option<&ProgressRecord> {
        self.progress
            .iter()
            .find(|r| r.user_id == user_id && r.date == date)
    }

    pub fn upsert_progress(&mut self, record: ProgressRecord) {
        match self
            .progress
            .iter_mut()
            .find(|r| r.user_id == record.user_id && r.date == record.date)
        {
            Some(slot) => *slot = record,
            None => self.progress.push(record),
        }
    }

    pub fn progress_for_user(&self, user_id: Uuid) -> Vec<&ProgressRecord> {
        self.progress
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }
}
