// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The remote source contract.

use crate::{Error, Page};

/// Trait for remote collections served in pages.
///
/// The cache only ever asks for whole pages: `index` is a multiple of the page size
/// and `count` equals the page size. A page holding fewer than `count` items marks the
/// end of the collection.
///
/// Dropping a returned future cancels the request. Timeouts are the source's concern.
pub trait PageSource<T>: Send + Sync {
    /// Stable identity of the collection.
    ///
    /// A store filled from a source with a different identity is discarded.
    fn identifier(&self) -> &str;

    /// Reads up to `count` items starting at `index`.
    fn read(&self, index: u64, count: u64) -> impl Future<Output = Result<Page<T>, Error>> + Send;

    /// Returns the total number of items in the collection.
    fn count(&self) -> impl Future<Output = Result<u64, Error>> + Send;
}
