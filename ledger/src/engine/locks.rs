use overdrive_types::Key;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key async locks.
///
/// `acquire` sorts and dedups the requested keys and takes them in ascending
/// order, so any two operations contending on overlapping key sets always
/// lock their intersection in the same order and cannot deadlock. Guards are
/// owned, which lets a caller hold them across awaits while it reads, checks,
/// and commits.
#[derive(Default)]
pub(crate) struct KeyLocks {
    table: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    async fn handle(&self, key: &Key) -> Arc<Mutex<()>> {
        let mut table = self.table.lock().await;
        table.entry(key.clone()).or_default().clone()
    }

    pub async fn acquire(&self, mut keys: Vec<Key>) -> Vec<OwnedMutexGuard<()>> {
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            let handle = self.handle(key).await;
            guards.push(handle.lock_owned().await);
        }
        guards
    }
}
