use anyhow::{Context as _, Result};
use commonware_codec::Encode;
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_runtime::{Clock, Metrics, Spawner, Storage};
use commonware_storage::adb::any::variable::Any as AnyAdb;
use commonware_storage::translator::Translator;
use overdrive_types::{Key, Value};
use std::future::Future;

#[cfg(any(test, feature = "mocks"))]
use std::collections::HashMap;

/// Authenticated database keyed by the SHA-256 hash of the encoded [Key].
pub type Adb<E, T> = AnyAdb<E, Digest, Value, Sha256, T>;

/// Backing storage for the ledger.
///
/// The engine serializes access through its own locks; implementations only
/// need to make each call atomic on its single key. Records are never deleted
/// (accounts live forever and withdrawal requests are the audit log), so the
/// contract is get/insert only.
pub trait Store {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;

    /// Apply a batch of buffered writes.
    fn apply(&mut self, changes: Vec<(Key, Value)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, value) in changes {
                self.insert(key, value).await?;
            }
            Ok(())
        }
    }
}

impl<E: Spawner + Metrics + Clock + Storage, T: Translator> Store for Adb<E, T> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let key_hash = Sha256::hash(&key.encode());
        AnyAdb::get(self, &key_hash).await.context("adb get")
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        let key_hash = Sha256::hash(&key.encode());
        self.update(key_hash, value).await.context("adb update")?;
        Ok(())
    }
}

/// HashMap-backed store for tests and the simulator.
#[cfg(any(test, feature = "mocks"))]
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

#[cfg(any(test, feature = "mocks"))]
impl Store for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }
}
