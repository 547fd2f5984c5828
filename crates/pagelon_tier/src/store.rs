// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The local store contract.

use crate::{Error, StoreKey, StoreRecord};

/// Trait for local page stores.
///
/// A store retains the pages fetched from a [`PageSource`](crate::PageSource) plus
/// one settings record. The paging cache serializes its writes: at most one
/// `add_or_update` is in flight per cache, and `clear` never overlaps a write.
///
/// Every method but `close` is required. `close` defaults to doing nothing.
pub trait PageStore<T>: Send + Sync {
    /// Returns `true` if a record exists under `key`.
    fn contains(&self, key: StoreKey) -> impl Future<Output = Result<bool, Error>> + Send;

    /// Reads the record under `key`.
    fn read(&self, key: StoreKey) -> impl Future<Output = Result<Option<StoreRecord<T>>, Error>> + Send;

    /// Writes `record` under `key`, replacing any previous record.
    fn add_or_update(&self, key: StoreKey, record: StoreRecord<T>) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes the record under `key`, if any.
    fn remove(&self, key: StoreKey) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes every record.
    fn clear(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Releases resources held by the store.
    ///
    /// Called after the cache cleared the store. A closed store must still accept
    /// further calls.
    fn close(&self) {}
}
