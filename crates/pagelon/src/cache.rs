// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The user-facing cache handle.

use std::fmt;
use std::sync::Arc;

use futures::Stream;
use pagelon_tier::{PageSource, PageStore, Settings};

use crate::builder::CacheBuilder;
use crate::engine::Shared;
use crate::filter::{self, Direction, FilterMatch};
use crate::{CacheState, Error, EstimateSize, Request, Stats};

/// An on-demand paging cache over a remote collection.
///
/// Reads are served from the local store where possible and fetched from the source
/// one page at a time otherwise. Every fetched page is saved to the store, within the
/// configured byte budget, and pages following a read are prefetched in the
/// background.
///
/// Handles are cheap to clone and share the same cache.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # fn main() {
/// use pagelon::Cache;
/// use pagelon_tier::testing::VecSource;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source = VecSource::new("letters", vec!['a', 'b', 'c', 'd', 'e']);
/// let cache = Cache::builder::<char, _>("letters", source)
///     .page_size(2)
///     .memory()
///     .build()?;
///
/// let items = cache.read_range(1, 3)?.await?;
/// assert_eq!(items, vec!['b', 'c', 'd']);
/// # Ok::<(), pagelon::Error>(())
/// # }).unwrap();
/// # }
/// # #[cfg(not(feature = "test-util"))]
/// # fn main() {}
/// ```
pub struct Cache<T, Src, St> {
    pub(crate) shared: Arc<Shared<T, Src, St>>,
}

impl Cache<(), (), ()> {
    /// Creates a builder for a cache named `name` over `source`.
    ///
    /// The name identifies the cache in logs and metrics.
    #[must_use]
    pub fn builder<T, Src>(name: impl Into<String>, source: Src) -> CacheBuilder<T, Src>
    where
        Src: PageSource<T>,
    {
        CacheBuilder::new(name.into(), source)
    }
}

impl<T, Src, St> Cache<T, Src, St>
where
    T: EstimateSize + Clone + Send + Sync + 'static,
    Src: PageSource<T> + 'static,
    St: PageStore<T> + 'static,
{
    /// The name of this cache.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Number of items in one page.
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.shared.options.page_size
    }

    /// Counters of the work done since the cache was created or last cleared.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.shared.stats()
    }

    /// The current state of the cache.
    #[must_use]
    pub fn state(&self) -> CacheState {
        self.shared.state()
    }

    /// A snapshot of the settings record as it would be persisted now.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.shared.settings()
    }

    /// Returns `true` once the byte budget stopped the cache from saving pages.
    #[must_use]
    pub fn is_overflowed(&self) -> bool {
        self.shared.is_overflowed()
    }

    /// Reads, prefetches and clears that have not finished yet.
    #[must_use]
    pub fn pending_operations(&self) -> usize {
        self.shared.pending_operations()
    }

    /// Counts the items of the collection.
    ///
    /// Answered locally once the whole collection is in the store, otherwise asked of
    /// the source.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if the cache failed to start.
    pub fn count(&self) -> Result<Request<u64>, Error> {
        self.shared.count()
    }

    /// Reads `count` items starting at `index`.
    ///
    /// The request resolves with fewer items if the collection ends inside the range.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if the cache failed to start.
    pub fn read_range(&self, index: u64, count: u64) -> Result<Request<Vec<T>>, Error> {
        self.shared.read_range(index, count)
    }

    /// Empties the store and resets all bookkeeping.
    ///
    /// Every read and prefetch in flight is canceled. Concurrent clears share one
    /// underlying operation. A clear cannot be canceled.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if the cache failed to start.
    pub fn clear(&self) -> Result<Request<()>, Error> {
        self.shared.clear()
    }

    /// Scans forward from `index` for items accepted by `predicate`.
    ///
    /// Stops after `limit` matches, or at the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if the cache failed to start.
    pub fn filter_forward<P>(
        &self,
        index: u64,
        limit: Option<usize>,
        predicate: P,
    ) -> Result<Request<Vec<FilterMatch<T>>>, Error>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filter::filter(&self.shared, Direction::Forward, index, limit, predicate)
    }

    /// Scans backward from `index` down to the start of the collection.
    ///
    /// Matches are returned in ascending index order; with a `limit`, the ones closest
    /// to `index` are kept.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if the cache failed to start.
    pub fn filter_back<P>(
        &self,
        index: u64,
        limit: Option<usize>,
        predicate: P,
    ) -> Result<Request<Vec<FilterMatch<T>>>, Error>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filter::filter(&self.shared, Direction::Back, index, limit, predicate)
    }

    /// Streams every item of the collection in order.
    ///
    /// The stream ends after the first error.
    pub fn stream(&self) -> impl Stream<Item = Result<T, Error>> + Send + 'static {
        filter::stream(Arc::clone(&self.shared))
    }
}

impl<T, Src, St> Clone for Cache<T, Src, St> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, Src, St> fmt::Debug for Cache<T, Src, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.shared.name)
            .field("options", &self.shared.options)
            .finish_non_exhaustive()
    }
}
