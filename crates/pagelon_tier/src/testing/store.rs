// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Error, PageStore, StoreKey, StoreRecord};

/// Recorded store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<T> {
    /// `contains` was called with the given key.
    Contains(StoreKey),
    /// `read` was called with the given key.
    Read(StoreKey),
    /// `add_or_update` was called.
    AddOrUpdate {
        /// The key written.
        key: StoreKey,
        /// The record written.
        record: StoreRecord<T>,
    },
    /// `remove` was called with the given key.
    Remove(StoreKey),
    /// `clear` was called.
    Clear,
    /// `close` was called.
    Close,
}

impl<T> StoreOp<T> {
    /// The key this operation touched, if any.
    #[must_use]
    pub fn key(&self) -> Option<StoreKey> {
        match self {
            Self::Contains(key) | Self::Read(key) | Self::Remove(key) | Self::AddOrUpdate { key, .. } => Some(*key),
            Self::Clear | Self::Close => None,
        }
    }

    /// Returns `true` if this operation wrote a page.
    #[must_use]
    pub fn is_page_write(&self) -> bool {
        matches!(self, Self::AddOrUpdate { key: StoreKey::Page(_), .. })
    }
}

type FailPredicate<T> = Box<dyn Fn(&StoreOp<T>) -> bool + Send + Sync>;

/// A configurable in-memory store for testing.
///
/// Records are kept in key order. All operations are recorded, including failed ones.
///
/// # Examples
///
/// ```
/// use pagelon_tier::testing::{MockStore, StoreOp};
/// use pagelon_tier::{Page, PageStore, StoreKey, StoreRecord};
/// # futures::executor::block_on(async {
///
/// let store = MockStore::<u32>::new();
/// store.add_or_update(StoreKey::Page(0), StoreRecord::Page(Page::new(0, vec![1, 2]))).await.unwrap();
///
/// assert!(store.contains_key(StoreKey::Page(0)));
///
/// store.fail_when(|op| matches!(op, StoreOp::Read(_)));
/// assert!(store.read(StoreKey::Page(0)).await.is_err());
/// # });
/// ```
pub struct MockStore<T> {
    data: Arc<Mutex<BTreeMap<StoreKey, StoreRecord<T>>>>,
    operations: Arc<Mutex<Vec<StoreOp<T>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<T>>>>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for MockStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<T> Clone for MockStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<T> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MockStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(BTreeMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Writes a record directly, without recording an operation.
    pub fn seed(&self, key: StoreKey, record: StoreRecord<T>) {
        self.data.lock().insert(key, record);
    }

    /// Returns the number of records held.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns `true` if a record exists under `key`.
    #[must_use]
    pub fn contains_key(&self, key: StoreKey) -> bool {
        self.data.lock().contains_key(&key)
    }

    /// Returns the keys of all held pages in ascending order.
    #[must_use]
    pub fn page_keys(&self) -> Vec<u64> {
        self.data
            .lock()
            .keys()
            .filter_map(|key| match key {
                StoreKey::Page(index) => Some(*index),
                StoreKey::Settings => None,
            })
            .collect()
    }

    /// Sets a predicate deciding which operations fail.
    ///
    /// Replaces any previous predicate.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp<T>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Removes the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    fn should_fail(&self, op: &StoreOp<T>) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

impl<T: Clone> MockStore<T> {
    /// Returns the record under `key`, without recording an operation.
    #[must_use]
    pub fn get(&self, key: StoreKey) -> Option<StoreRecord<T>> {
        self.data.lock().get(&key).cloned()
    }

    /// Returns all recorded operations in call order.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp<T>> {
        self.operations.lock().clone()
    }

    /// Forgets all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp<T>) -> Result<(), Error> {
        let failed = self.should_fail(&op);
        self.operations.lock().push(op);
        if failed {
            return Err(Error::from_message("mock store: injected failure"));
        }
        Ok(())
    }
}

impl<T> PageStore<T> for MockStore<T>
where
    T: Clone + Send + Sync,
{
    async fn contains(&self, key: StoreKey) -> Result<bool, Error> {
        self.record(StoreOp::Contains(key))?;
        Ok(self.data.lock().contains_key(&key))
    }

    async fn read(&self, key: StoreKey) -> Result<Option<StoreRecord<T>>, Error> {
        self.record(StoreOp::Read(key))?;
        Ok(self.data.lock().get(&key).cloned())
    }

    async fn add_or_update(&self, key: StoreKey, record: StoreRecord<T>) -> Result<(), Error> {
        self.record(StoreOp::AddOrUpdate {
            key,
            record: record.clone(),
        })?;
        self.data.lock().insert(key, record);
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), Error> {
        self.record(StoreOp::Remove(key))?;
        self.data.lock().remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.record(StoreOp::Clear)?;
        self.data.lock().clear();
        Ok(())
    }

    fn close(&self) {
        self.operations.lock().push(StoreOp::Close);
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::Page;

    #[test]
    fn records_operations_in_order() {
        block_on(async {
            let store = MockStore::<u8>::new();
            let record = StoreRecord::Page(Page::new(0, vec![7]));

            store.add_or_update(StoreKey::Page(0), record.clone()).await.unwrap();
            assert!(store.contains(StoreKey::Page(0)).await.unwrap());
            store.remove(StoreKey::Page(0)).await.unwrap();
            store.close();

            assert_eq!(
                store.operations(),
                vec![
                    StoreOp::AddOrUpdate {
                        key: StoreKey::Page(0),
                        record,
                    },
                    StoreOp::Contains(StoreKey::Page(0)),
                    StoreOp::Remove(StoreKey::Page(0)),
                    StoreOp::Close,
                ]
            );
        });
    }

    #[test]
    fn failed_write_leaves_data_untouched() {
        block_on(async {
            let store = MockStore::<u8>::new();
            store.fail_when(StoreOp::is_page_write);

            let result = store
                .add_or_update(StoreKey::Page(0), StoreRecord::Page(Page::new(0, vec![1])))
                .await;

            assert!(result.is_err());
            assert_eq!(store.entry_count(), 0);
            assert_eq!(store.operations().len(), 1);
        });
    }

    #[test]
    fn page_keys_skip_settings() {
        let store = MockStore::<u8>::new();
        store.seed(StoreKey::Page(20), StoreRecord::Page(Page::empty(20)));
        store.seed(StoreKey::Page(0), StoreRecord::Page(Page::empty(0)));
        store.seed(
            StoreKey::Settings,
            StoreRecord::Settings(crate::Settings {
                actual_cache_size: 0,
                all_data_local: false,
                cache_size: 0,
                collection_count: None,
                highest_saved_page: 0,
                highest_saved_page_size: 0,
                page_size: 20,
                source_id: String::new(),
                version: crate::SETTINGS_VERSION.to_string(),
            }),
        );

        assert_eq!(store.page_keys(), vec![0, 20]);
        assert_eq!(store.entry_count(), 3);
    }

    #[test]
    fn clear_failures_restores_success() {
        block_on(async {
            let store = MockStore::<u8>::new();
            store.fail_when(|_| true);
            assert!(store.clear().await.is_err());

            store.clear_failures();
            assert!(store.clear().await.is_ok());
        });
    }
}
