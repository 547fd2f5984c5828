// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Range arithmetic over item positions.

use pagelon_tier::Page;

/// A window of `count` items starting at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Range {
    pub index: u64,
    pub count: u64,
}

impl Range {
    pub fn new(index: u64, count: u64) -> Self {
        Self { index, count }
    }

    pub fn of_page<T>(page: &Page<T>) -> Self {
        Self::new(page.index(), page.count())
    }

    /// Position one past the last item.
    pub fn end(self) -> u64 {
        self.index.saturating_add(self.count)
    }
}

/// Returns the overlap of two ranges.
///
/// Touching ranges overlap in an empty range at the shared boundary.
pub(crate) fn intersect(x: Range, y: Range) -> Option<Range> {
    let first = x.index.max(y.index);
    let last = x.end().min(y.end());
    (last >= first).then(|| Range::new(first, last - first))
}

/// Widens `[low, high]` to whole pages.
///
/// `page_size` must not be zero.
pub(crate) fn snap_to_page_boundaries(low: u64, high: u64, page_size: u64) -> Range {
    let start = low / page_size * page_size;
    let end = high.saturating_add(1).div_ceil(page_size).saturating_mul(page_size);
    Range::new(start, end - start)
}

/// Appends the items of `page` that fall inside `requested`, up to what `accumulated`
/// still lacks.
pub(crate) fn append_page<T: Clone>(requested: Range, accumulated: &mut Vec<T>, page: &Page<T>) {
    let Some(overlap) = intersect(requested, Range::of_page(page)) else {
        return;
    };

    let missing = usize::try_from(requested.count)
        .unwrap_or(usize::MAX)
        .saturating_sub(accumulated.len());
    let start = usize::try_from(overlap.index - page.index()).unwrap_or(usize::MAX);
    let end = start.saturating_add(missing).min(page.data().len());

    if start < end {
        accumulated.extend_from_slice(&page.data()[start..end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_overlapping() {
        assert_eq!(intersect(Range::new(1, 3), Range::new(2, 2)), Some(Range::new(2, 2)));
        assert_eq!(intersect(Range::new(0, 10), Range::new(5, 10)), Some(Range::new(5, 5)));
    }

    #[test]
    fn intersect_touching_is_empty() {
        assert_eq!(intersect(Range::new(0, 2), Range::new(2, 2)), Some(Range::new(2, 0)));
    }

    #[test]
    fn intersect_disjoint_is_none() {
        assert_eq!(intersect(Range::new(0, 2), Range::new(3, 2)), None);
        assert_eq!(intersect(Range::new(6, 1), Range::new(0, 4)), None);
    }

    #[test]
    fn snap_widens_to_pages() {
        assert_eq!(snap_to_page_boundaries(1, 3, 2), Range::new(0, 4));
        assert_eq!(snap_to_page_boundaries(0, 0, 2), Range::new(0, 2));
        assert_eq!(snap_to_page_boundaries(7, 7, 5), Range::new(5, 5));
        assert_eq!(snap_to_page_boundaries(10, 19, 10), Range::new(10, 10));
    }

    #[test]
    fn snap_keeps_page_aligned_start() {
        for low in 0..40 {
            let range = snap_to_page_boundaries(low, low + 3, 7);
            assert_eq!(range.index % 7, 0);
            assert_eq!(range.count % 7, 0);
            assert!(range.index <= low && range.end() > low + 3);
        }
    }

    #[test]
    fn append_takes_overlap_only() {
        let mut data = Vec::new();
        append_page(Range::new(1, 3), &mut data, &Page::new(0, vec!['a', 'b']));
        assert_eq!(data, vec!['b']);

        append_page(Range::new(1, 3), &mut data, &Page::new(2, vec!['c', 'd']));
        assert_eq!(data, vec!['b', 'c', 'd']);
    }

    #[test]
    fn append_stops_at_requested_count() {
        let mut data = Vec::new();
        append_page(Range::new(0, 3), &mut data, &Page::new(0, vec![1, 2, 3, 4, 5]));
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn append_short_and_empty_pages() {
        let mut data = vec![1];
        append_page(Range::new(3, 5), &mut data, &Page::new(4, vec![5]));
        assert_eq!(data, vec![1, 5]);

        append_page(Range::new(3, 5), &mut data, &Page::<i32>::empty(6));
        assert_eq!(data, vec![1, 5]);
    }

    #[test]
    fn append_disjoint_page_is_ignored() {
        let mut data: Vec<u8> = Vec::new();
        append_page(Range::new(10, 2), &mut data, &Page::new(0, vec![1, 2]));
        assert!(data.is_empty());
    }
}
