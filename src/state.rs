use std::{collections::HashMap, path::PathBuf, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

// Shared handler state: the store path plus keyed mutual exclusion.
// Mutations for one user are serialized through that user's lock so
// racing completion events cannot both read the same "before" streak
// state; independent users proceed in parallel.
#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    user_locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> AppState {
        AppState {
            db_path,
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Acquire the per-user lock. Held across load-compute-save.
    pub async fn lock_user(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let cell = {
            let mut locks = self.user_locks.lock().await;
            locks.entry(user_id).or_default().clone()
        };
        cell.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let state = AppState::new(PathBuf::from("unused.json"));
        let _a = state.lock_user(Uuid::new_v4()).await;
        // would deadlock if the lock were global
        let _b = state.lock_user(Uuid::new_v4()).await;
    }

    #[tokio::test]
    async fn same_user_lock_is_exclusive() {
        let state = AppState::new(PathBuf::from("unused.json"));
        let user = Uuid::new_v4();
        let guard = state.lock_user(user).await;

        let state2 = state.clone();
        let contender = tokio::spawn(async move {
            let _g = state2.lock_user(user).await;
        });
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
