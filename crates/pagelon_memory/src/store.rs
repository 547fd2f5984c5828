// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use moka::future::Cache;
use pagelon_tier::{Error, PageStore, StoreKey, StoreRecord};

use crate::MemoryStoreBuilder;

/// An in-memory page store backed by moka.
///
/// Clones share the same records.
///
/// # Examples
///
/// ```
/// use pagelon_memory::MemoryStore;
/// use pagelon_tier::{Page, PageStore, StoreKey, StoreRecord};
/// # futures::executor::block_on(async {
///
/// let store = MemoryStore::<u32>::new();
/// let shared = store.clone();
///
/// store.add_or_update(StoreKey::Page(10), StoreRecord::Page(Page::new(10, vec![1]))).await.unwrap();
/// assert!(shared.contains(StoreKey::Page(10)).await.unwrap());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Cache<StoreKey, StoreRecord<T>>,
}

impl<T> Default for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring a store.
    #[must_use]
    pub fn builder() -> MemoryStoreBuilder<T> {
        MemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryStoreBuilder<T>) -> Self {
        let mut moka_builder = Cache::builder();

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }

    /// Returns the number of held records.
    ///
    /// The count may lag behind writes that have not been fully applied yet.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl<T> PageStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn contains(&self, key: StoreKey) -> Result<bool, Error> {
        Ok(self.inner.contains_key(&key))
    }

    async fn read(&self, key: StoreKey) -> Result<Option<StoreRecord<T>>, Error> {
        Ok(self.inner.get(&key).await)
    }

    async fn add_or_update(&self, key: StoreKey, record: StoreRecord<T>) -> Result<(), Error> {
        self.inner.insert(key, record).await;
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), Error> {
        self.inner.invalidate(&key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        Ok(())
    }
}
