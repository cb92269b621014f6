use crate::store::Store;
use anyhow::Result;
use overdrive_types::{Key, Value};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// One operation's buffered writes over the shared store.
///
/// Reads see the operation's own pending writes first and fall through to the
/// store. Nothing touches the store mutably until `commit`, which applies the
/// whole batch; an operation that errors out before commit leaves no trace.
pub(crate) struct Txn<'a, S: Store> {
    store: &'a RwLock<S>,
    pending: BTreeMap<Key, Value>,
}

impl<'a, S: Store> Txn<'a, S> {
    pub fn new(store: &'a RwLock<S>) -> Self {
        Self {
            store,
            pending: BTreeMap::new(),
        }
    }

    pub async fn get(&self, key: &Key) -> Result<Option<Value>> {
        if let Some(value) = self.pending.get(key) {
            return Ok(Some(value.clone()));
        }
        self.store.read().await.get(key).await
    }

    pub fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, value);
    }

    pub async fn commit(self) -> Result<()> {
        let changes: Vec<(Key, Value)> = self.pending.into_iter().collect();
        self.store.write().await.apply(changes).await
    }
}
