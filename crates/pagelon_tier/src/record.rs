// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use crate::Page;

/// Version written into every new [`Settings`] record.
///
/// Readers accept any record whose version starts with `"1."`.
pub const SETTINGS_VERSION: &str = "1.0";

/// Key of a record held by a [`PageStore`](crate::PageStore).
///
/// Pages are keyed by the index of their first item, which is always a multiple of
/// the page size. The settings record lives under its own reserved key that never
/// collides with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// The page starting at the given item index.
    Page(u64),
    /// The cache settings record.
    Settings,
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(index) => write!(f, "{index}"),
            Self::Settings => f.write_str("__settings"),
        }
    }
}

/// A value held by a [`PageStore`](crate::PageStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRecord<T> {
    /// A cached page.
    Page(Page<T>),
    /// The cache settings record.
    Settings(Settings),
}

/// Bookkeeping persisted alongside the cached pages.
///
/// The record describes the shape of the store (page size and the identity of the
/// source it was filled from) together with how much of the collection it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Estimated bytes of all saved pages.
    pub actual_cache_size: u64,
    /// `true` once every item of the collection has been saved.
    pub all_data_local: bool,
    /// Byte budget of the store.
    pub cache_size: u64,
    /// Total items in the collection, once known.
    pub collection_count: Option<u64>,
    /// Index of the highest saved page.
    pub highest_saved_page: u64,
    /// Item count of the highest saved page.
    pub highest_saved_page_size: u64,
    /// Items per page.
    pub page_size: u64,
    /// Identity of the source the pages were fetched from.
    pub source_id: String,
    /// Format version of this record.
    pub version: String,
}

impl Settings {
    /// Returns `true` if this record was written by a compatible format version.
    #[must_use]
    pub fn is_supported_version(&self) -> bool {
        self.version.starts_with("1.")
    }
}
