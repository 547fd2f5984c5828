// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::marker::PhantomData;

use crate::MemoryStore;

/// Builder for [`MemoryStore`].
///
/// # Examples
///
/// ```
/// use pagelon_memory::MemoryStoreBuilder;
///
/// let store = MemoryStoreBuilder::<u64>::new()
///     .name("orders")
///     .initial_capacity(64)
///     .build();
/// ```
#[derive(Debug)]
pub struct MemoryStoreBuilder<T> {
    pub(crate) name: Option<String>,
    pub(crate) initial_capacity: Option<usize>,
    _phantom: PhantomData<T>,
}

impl<T> Default for MemoryStoreBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryStoreBuilder<T> {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            initial_capacity: None,
            _phantom: PhantomData,
        }
    }

    /// Names the underlying moka cache, for diagnostics.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Pre-allocates room for `capacity` records.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }
}

impl<T> MemoryStoreBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Builds the store.
    #[must_use]
    pub fn build(self) -> MemoryStore<T> {
        MemoryStore::from_builder(&self)
    }
}
