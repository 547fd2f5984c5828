// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Configuration of a [`Cache`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "memory")]
use pagelon_memory::MemoryStore;
use pagelon_tier::{PageSource, PageStore};

use crate::engine::{IdleCallback, Options, Shared};
use crate::telemetry::CacheTelemetry;
use crate::{Cache, Error, EstimateSize, Spawner};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Store budget in bytes used when none is configured.
pub const DEFAULT_CACHE_SIZE: u64 = 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefetch {
    OnePage,
    Items(u64),
    Unbounded,
}

/// Builder for a [`Cache`].
///
/// Created by [`Cache::builder`]. A store must be chosen with [`memory`](Self::memory)
/// or [`store`](Self::store) before the cache can be built.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # fn main() {
/// use pagelon::Cache;
/// use pagelon_tier::testing::{MockStore, VecSource};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let cache = Cache::builder::<u32, _>("numbers", VecSource::new("numbers", (0..100).collect()))
///     .page_size(10)
///     .cache_size(64 * 1024)
///     .prefetch_size(30)
///     .store(MockStore::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.page_size(), 10);
/// # });
/// # }
/// # #[cfg(not(feature = "test-util"))]
/// # fn main() {}
/// ```
pub struct CacheBuilder<T, Src, St = ()> {
    name: String,
    source: Src,
    store: St,
    page_size: u64,
    cache_size: u64,
    prefetch: Prefetch,
    on_idle: Option<IdleCallback>,
    spawner: Option<Spawner>,
    telemetry: CacheTelemetry,
    _items: PhantomData<fn() -> T>,
}

impl<T, Src> CacheBuilder<T, Src, ()>
where
    Src: PageSource<T>,
{
    pub(crate) fn new(name: String, source: Src) -> Self {
        Self {
            name,
            source,
            store: (),
            page_size: DEFAULT_PAGE_SIZE,
            cache_size: DEFAULT_CACHE_SIZE,
            prefetch: Prefetch::OnePage,
            on_idle: None,
            spawner: None,
            telemetry: CacheTelemetry::default(),
            _items: PhantomData,
        }
    }

    /// Uses `store` to persist pages and settings.
    ///
    /// A store that already holds the settings of a cache with the same page size and
    /// source resumes from what it holds; any other store content is cleared.
    pub fn store<St>(self, store: St) -> CacheBuilder<T, Src, St>
    where
        St: PageStore<T>,
    {
        CacheBuilder {
            name: self.name,
            source: self.source,
            store,
            page_size: self.page_size,
            cache_size: self.cache_size,
            prefetch: self.prefetch,
            on_idle: self.on_idle,
            spawner: self.spawner,
            telemetry: self.telemetry,
            _items: PhantomData,
        }
    }

    /// Keeps pages in a fresh in-memory store.
    #[cfg(feature = "memory")]
    #[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
    #[must_use]
    pub fn memory(self) -> CacheBuilder<T, Src, MemoryStore<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let store = MemoryStore::builder().name(self.name.clone()).build();
        self.store(store)
    }
}

impl<T, Src, St> CacheBuilder<T, Src, St> {
    /// Sets the number of items in one page.
    ///
    /// Defaults to [`DEFAULT_PAGE_SIZE`]. Unless set otherwise, the prefetch size
    /// follows the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the byte budget of the store.
    ///
    /// Once saving a page would exceed it, the cache stops saving pages. Zero disables
    /// saving altogether. Defaults to [`DEFAULT_CACHE_SIZE`].
    #[must_use]
    pub fn cache_size(mut self, cache_size: u64) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Sets how many items past a read are fetched in the background.
    ///
    /// Zero disables prefetching.
    #[must_use]
    pub fn prefetch_size(mut self, items: u64) -> Self {
        self.prefetch = Prefetch::Items(items);
        self
    }

    /// Prefetches past every read until the collection or the budget ends.
    #[must_use]
    pub fn prefetch_unbounded(mut self) -> Self {
        self.prefetch = Prefetch::Unbounded;
        self
    }

    /// Calls `on_idle` each time the last pending operation finishes.
    ///
    /// The callback runs on whichever task finished the operation and must not block.
    #[must_use]
    pub fn on_idle<F>(mut self, on_idle: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_idle = Some(Arc::new(on_idle));
        self
    }

    /// Sets the spawner running store and source requests.
    ///
    /// With the `tokio` feature the ambient Tokio runtime is used by default.
    #[must_use]
    pub fn spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Records cache events and the store size as OpenTelemetry metrics.
    #[cfg(feature = "metrics")]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn meter_provider(mut self, meter_provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        self.telemetry = CacheTelemetry::with_meter_provider(meter_provider);
        self
    }

    fn options(&self) -> Result<Options, Error> {
        if self.name.is_empty() {
            return Err(Error::InvalidOptions("the cache name must not be empty".into()));
        }

        if self.page_size == 0 {
            return Err(Error::InvalidOptions("the page size must be greater than zero".into()));
        }

        Ok(Options {
            page_size: self.page_size,
            cache_size: self.cache_size,
            prefetch_size: match self.prefetch {
                Prefetch::OnePage => Some(self.page_size),
                Prefetch::Items(items) => Some(items),
                Prefetch::Unbounded => None,
            },
        })
    }
}

impl<T, Src, St> CacheBuilder<T, Src, St>
where
    T: EstimateSize + Clone + Send + Sync + 'static,
    Src: PageSource<T> + 'static,
    St: PageStore<T> + 'static,
{
    /// Builds the cache and starts loading its settings from the store.
    ///
    /// Operations issued before the settings are loaded wait for them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if the name is empty, the page size is zero,
    /// or no spawner is available.
    pub fn build(self) -> Result<Cache<T, Src, St>, Error> {
        let options = self.options()?;
        let spawner = self.spawner.map_or_else(default_spawner, Ok)?;

        tracing::debug!(
            cache.name = self.name.as_str(),
            page_size = options.page_size,
            cache_size = options.cache_size,
            "pagelon.build"
        );

        let shared = Shared::new(
            self.name,
            options,
            self.source,
            self.store,
            spawner,
            self.telemetry,
            self.on_idle,
        );
        shared.start();

        Ok(Cache { shared })
    }
}

#[cfg(feature = "tokio")]
#[expect(clippy::unnecessary_wraps, reason = "mirrors the fallible variant without tokio")]
fn default_spawner() -> Result<Spawner, Error> {
    Ok(Spawner::new_tokio())
}

#[cfg(not(feature = "tokio"))]
fn default_spawner() -> Result<Spawner, Error> {
    Err(Error::InvalidOptions("a spawner is required".into()))
}

impl<T, Src, St> fmt::Debug for CacheBuilder<T, Src, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("name", &self.name)
            .field("page_size", &self.page_size)
            .field("cache_size", &self.cache_size)
            .field("prefetch", &self.prefetch)
            .field("spawner", &self.spawner)
            .finish_non_exhaustive()
    }
}
