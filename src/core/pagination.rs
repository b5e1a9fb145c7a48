//! Client-side pagination over a fetched collection.
//!
//! The backend returns whole collections; filtering and paging happen here.
//! Pages are 1-based. Out-of-range requests are clamped, so the page handed
//! back is never empty unless the collection itself is.

use std::num::NonZeroUsize;

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// 1-based page number actually returned (after clamping)
    pub page: usize,
    /// Total number of pages; at least 1
    pub total_pages: usize,
    /// Number of items in the whole (filtered) collection
    pub total_items: usize,
    /// Items on this page
    pub items: &'a [T],
}

impl<T> Page<'_, T> {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Zero-based index of the first item on this page within the collection.
    #[must_use]
    pub const fn offset(&self, per_page: NonZeroUsize) -> usize {
        (self.page - 1) * per_page.get()
    }
}

/// Number of pages needed for `total_items`; an empty collection has one (empty) page.
#[must_use]
pub const fn page_count(total_items: usize, per_page: NonZeroUsize) -> usize {
    if total_items == 0 {
        1
    } else {
        total_items.div_ceil(per_page.get())
    }
}

/// Returns page `page` of `items`: the slice `[(page-1)*per_page, min(page*per_page, len))`.
///
/// `page` is clamped to `1..=total_pages`.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, per_page: NonZeroUsize) -> Page<'_, T> {
    let total_items = items.len();
    let total_pages = page_count(total_items, per_page);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page.get();
    let end = (page * per_page.get()).min(total_items);

    Page {
        page,
        total_pages,
        total_items,
        items: &items[start.min(end)..end],
    }
}

/// Filters a collection, then returns the requested page of the matches.
///
/// The filtered items are collected into `buffer` so the returned page can borrow them.
pub fn filter_then_paginate<'a, T: Clone>(
    items: &[T],
    predicate: impl Fn(&T) -> bool,
    page: usize,
    per_page: NonZeroUsize,
    buffer: &'a mut Vec<T>,
) -> Page<'a, T> {
    buffer.clear();
    buffer.extend(items.iter().filter(|item| predicate(item)).cloned());
    paginate(buffer, page, per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_page(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
    }

    #[test]
    fn test_page_bounds() {
        let items: Vec<u32> = (0..23).collect();

        let first = paginate(&items, 1, per_page(10));
        assert_eq!(first.items, &items[0..10]);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 3, per_page(10));
        assert_eq!(last.items, &items[20..23]);
        assert!(!last.has_next());
        assert_eq!(last.offset(per_page(10)), 20);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_trailing_page() {
        let items: Vec<u32> = (0..20).collect();
        let page = paginate(&items, 2, per_page(10));
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_out_of_range_pages_are_clamped() {
        let items: Vec<u32> = (0..5).collect();

        let beyond = paginate(&items, 99, per_page(2));
        assert_eq!(beyond.page, 3);
        assert_eq!(beyond.items, &[4]);

        let zero = paginate(&items, 0, per_page(2));
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items, &[0, 1]);
    }

    #[test]
    fn test_empty_collection() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 4, per_page(10));
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_every_page_matches_slice_formula() {
        for total in 0..30_usize {
            let items: Vec<usize> = (0..total).collect();
            for size in 1..7_usize {
                let pages = page_count(total, per_page(size));
                for i in 1..=pages {
                    let page = paginate(&items, i, per_page(size));
                    let start = (i - 1) * size;
                    let end = (i * size).min(total);
                    assert_eq!(page.items, &items[start..end]);
                    if total > 0 {
                        assert!(!page.items.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_filter_then_paginate() {
        let items: Vec<u32> = (1..=10).collect();
        let mut buffer = Vec::new();
        let page = filter_then_paginate(&items, |n| n % 2 == 0, 2, per_page(3), &mut buffer);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.items, &[8, 10]);
    }
}
