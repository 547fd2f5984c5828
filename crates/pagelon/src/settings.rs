// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory form of the persisted settings record.

use pagelon_tier::{SETTINGS_VERSION, Settings};

/// What the cache knows about the contents of its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bookkeeping {
    page_size: u64,
    cache_size: u64,
    actual_cache_size: u64,
    all_data_local: bool,
    collection_count: Option<u64>,
    highest_saved_page: u64,
    highest_saved_page_size: u64,
    overflowed: bool,
    version: String,
}

impl Bookkeeping {
    pub fn new(page_size: u64, cache_size: u64) -> Self {
        Self {
            page_size,
            cache_size,
            actual_cache_size: 0,
            all_data_local: false,
            collection_count: None,
            highest_saved_page: 0,
            highest_saved_page_size: 0,
            overflowed: cache_size == 0,
            version: SETTINGS_VERSION.to_string(),
        }
    }

    /// Resumes from a persisted record of the same shape.
    ///
    /// The configured budget wins over the persisted one. A store already at or over
    /// that budget starts overflowed.
    pub fn restore(settings: &Settings, cache_size: u64) -> Self {
        Self {
            page_size: settings.page_size,
            cache_size,
            actual_cache_size: settings.actual_cache_size,
            all_data_local: settings.all_data_local,
            collection_count: settings.collection_count,
            highest_saved_page: settings.highest_saved_page,
            highest_saved_page_size: settings.highest_saved_page_size,
            overflowed: settings.actual_cache_size >= cache_size,
            version: settings.version.clone(),
        }
    }

    /// Forgets everything saved, keeping the shape and version.
    pub fn reset(&mut self) {
        self.actual_cache_size = 0;
        self.all_data_local = false;
        self.collection_count = None;
        self.highest_saved_page = 0;
        self.highest_saved_page_size = 0;
        self.overflowed = self.cache_size == 0;
    }

    pub fn to_settings(&self, source_id: &str) -> Settings {
        Settings {
            actual_cache_size: self.actual_cache_size,
            all_data_local: self.all_data_local,
            cache_size: self.cache_size,
            collection_count: self.collection_count,
            highest_saved_page: self.highest_saved_page,
            highest_saved_page_size: self.highest_saved_page_size,
            page_size: self.page_size,
            source_id: source_id.to_string(),
            version: self.version.clone(),
        }
    }

    pub fn actual_cache_size(&self) -> u64 {
        self.actual_cache_size
    }

    pub fn all_data_local(&self) -> bool {
        self.all_data_local
    }

    pub fn collection_count(&self) -> Option<u64> {
        self.collection_count
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Returns `true` if a lookup of the page at `index` is known to find nothing.
    pub fn is_past_end(&self, index: u64) -> bool {
        self.all_data_local && self.collection_count.is_some_and(|count| index >= count)
    }

    /// Decides whether a page of `size` bytes may be written.
    ///
    /// A refusal marks the cache overflowed until the next reset.
    pub fn admit(&mut self, size: u64) -> bool {
        if self.overflowed || self.actual_cache_size.saturating_add(size) > self.cache_size {
            self.overflowed = true;
            return false;
        }
        true
    }

    /// Accounts for a page holding `count` items at `index`.
    ///
    /// Empty pages are probes past the end and never add to the saved size.
    pub fn record_page(&mut self, index: u64, count: u64, size: u64) {
        if count == 0 {
            let saved_end = self.highest_saved_page + self.highest_saved_page_size;
            if index == saved_end {
                self.collection_count = Some(saved_end);
            }
        } else {
            if index >= self.highest_saved_page {
                self.highest_saved_page = index;
                self.highest_saved_page_size = count;
            }
            self.actual_cache_size = self.actual_cache_size.saturating_add(size);
            if count < self.page_size && self.collection_count.is_none() {
                self.collection_count = Some(index + count);
            }
        }

        let saved_end = self.highest_saved_page + self.highest_saved_page_size;
        if self.collection_count == Some(saved_end) {
            self.all_data_local = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_starts_overflowed() {
        let mut books = Bookkeeping::new(10, 0);
        assert!(books.overflowed());
        assert!(!books.admit(0));
    }

    #[test]
    fn admit_refuses_past_budget() {
        let mut books = Bookkeeping::new(10, 100);
        assert!(books.admit(60));
        books.record_page(0, 10, 60);

        assert!(!books.admit(41));
        assert!(books.overflowed());

        // overflow sticks even for pages that would fit
        assert!(!books.admit(1));
    }

    #[test]
    fn full_pages_do_not_infer_count() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 2, 10);
        books.record_page(2, 2, 10);

        assert_eq!(books.collection_count(), None);
        assert!(!books.all_data_local());
        assert_eq!(books.actual_cache_size(), 20);
    }

    #[test]
    fn short_page_completes_collection() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 2, 10);
        books.record_page(2, 2, 10);
        books.record_page(4, 1, 5);

        assert_eq!(books.collection_count(), Some(5));
        assert!(books.all_data_local());
        assert!(books.is_past_end(5));
        assert!(!books.is_past_end(4));
    }

    #[test]
    fn short_page_marks_end_despite_gaps() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(4, 1, 5);

        assert_eq!(books.collection_count(), Some(5));
        // tracks the end of the collection, not gaps below it
        assert!(books.all_data_local());
    }

    #[test]
    fn empty_page_after_highest_sets_count() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 2, 10);
        books.record_page(2, 2, 10);
        books.record_page(4, 0, 0);

        assert_eq!(books.collection_count(), Some(4));
        assert!(books.all_data_local());
        assert_eq!(books.actual_cache_size(), 20);
    }

    #[test]
    fn empty_page_elsewhere_is_ignored() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 2, 10);
        books.record_page(8, 0, 0);

        assert_eq!(books.collection_count(), None);
        assert!(!books.all_data_local());
    }

    #[test]
    fn empty_collection() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 0, 0);

        assert_eq!(books.collection_count(), Some(0));
        assert!(books.all_data_local());
        assert!(books.is_past_end(0));
    }

    #[test]
    fn reset_keeps_shape() {
        let mut books = Bookkeeping::new(2, 10);
        books.record_page(0, 1, 5);
        assert!(!books.admit(6));

        books.reset();

        assert_eq!(books, Bookkeeping::new(2, 10));
    }

    #[test]
    fn settings_round_trip_through_restore() {
        let mut books = Bookkeeping::new(3, 500);
        books.record_page(0, 3, 40);
        books.record_page(3, 2, 30);

        let settings = books.to_settings("people");
        assert_eq!(settings.source_id, "people");
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.highest_saved_page, 3);
        assert_eq!(settings.highest_saved_page_size, 2);

        assert_eq!(Bookkeeping::restore(&settings, 500), books);
    }

    #[test]
    fn restore_prefers_configured_budget() {
        let settings = Bookkeeping::new(3, 500).to_settings("people");
        let books = Bookkeeping::restore(&settings, 0);

        assert!(books.overflowed());
        assert_eq!(books.to_settings("people").cache_size, 0);
    }

    #[test]
    fn restore_over_budget_starts_overflowed() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 2, 60);
        let settings = books.to_settings("people");

        let mut restored = Bookkeeping::restore(&settings, 50);

        assert!(restored.overflowed());
        assert!(!restored.admit(1));
    }

    #[test]
    fn restore_under_budget_admits_pages() {
        let mut books = Bookkeeping::new(2, 1000);
        books.record_page(0, 2, 60);
        let settings = books.to_settings("people");

        let mut restored = Bookkeeping::restore(&settings, 100);

        assert!(!restored.overflowed());
        assert!(restored.admit(40));
    }
}
