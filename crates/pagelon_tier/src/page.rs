// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// A contiguous window of a remote collection starting at `index`.
///
/// A page holds at most one page size worth of items. A page holding fewer items
/// marks the end of the collection.
///
/// # Examples
///
/// ```
/// use pagelon_tier::Page;
///
/// let page = Page::new(4, vec!["e", "f"]);
/// assert_eq!(page.index(), 4);
/// assert_eq!(page.count(), 2);
/// assert_eq!(page.end(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Page<T> {
    index: u64,
    data: Vec<T>,
}

impl<T> Page<T> {
    /// Creates a page starting at `index` holding `data`.
    #[must_use]
    pub fn new(index: u64, data: Vec<T>) -> Self {
        Self { index, data }
    }

    /// Creates a page at `index` with no items.
    #[must_use]
    pub fn empty(index: u64) -> Self {
        Self { index, data: Vec::new() }
    }

    /// Position of the first item in the collection.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Number of items held.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.data.len() as u64
    }

    /// Position one past the last item.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.index + self.count()
    }

    /// Returns `true` if the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The items of this page.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}
