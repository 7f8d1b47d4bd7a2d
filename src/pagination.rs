//! Pagination engine for experience and trip lists
//!
//! A [`PageWindow`] is derived fresh on every render from the total item
//! count, the page size and the current page. Page-change requests do not
//! clamp: a page past the end yields an empty slice rather than an error.

use serde::Serialize;

/// Lists with at most this many pages show every page number
const MAX_UNCOLLAPSED_PAGES: usize = 7;

/// Slicing bounds for one page of a paginated list
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page being displayed
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    /// `ceil(total_items / items_per_page)`, 0 for an empty list
    pub total_pages: usize,
    /// First item index on this page
    pub start_index: usize,
    /// Exclusive end index; may exceed `total_items` on the last page
    pub end_index: usize,
}

/// One entry in the row of page controls
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl PageWindow {
    /// Derive the window for `current_page`.
    ///
    /// `items_per_page` and `current_page` must be positive; this is checked
    /// in debug builds only.
    #[must_use]
    pub fn derive(total_items: usize, items_per_page: usize, current_page: usize) -> Self {
        debug_assert!(items_per_page > 0, "items_per_page must be positive");
        debug_assert!(current_page > 0, "current_page is 1-based");

        let total_pages = if items_per_page == 0 {
            0
        } else {
            total_items.div_ceil(items_per_page)
        };
        let start_index = current_page.saturating_sub(1).saturating_mul(items_per_page);
        let end_index = start_index.saturating_add(items_per_page);

        Self {
            current_page,
            items_per_page,
            total_items,
            total_pages,
            start_index,
            end_index,
        }
    }

    /// The items on this page, clamped to the bounds of `items`
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start_index.min(items.len());
        let end = self.end_index.min(items.len());
        items.get(start..end).unwrap_or_default()
    }

    /// Whether the current page lies past the last page (or the list is empty)
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        self.current_page == 0 || self.current_page > self.total_pages
    }

    /// Controls are only rendered when there is more than one page
    #[must_use]
    pub fn shows_controls(&self) -> bool {
        self.total_pages > 1
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Page numbers to render, collapsing long runs into ellipses
    #[must_use]
    pub fn visible_pages(&self) -> Vec<PageItem> {
        let total = self.total_pages;
        let current = self.current_page;

        if total <= MAX_UNCOLLAPSED_PAGES {
            return (1..=total).map(PageItem::Page).collect();
        }

        let mut items = Vec::with_capacity(MAX_UNCOLLAPSED_PAGES);
        if current <= 4 {
            items.extend((1..=5).map(PageItem::Page));
            items.push(PageItem::Ellipsis);
            items.push(PageItem::Page(total));
        } else if current >= total - 3 {
            items.push(PageItem::Page(1));
            items.push(PageItem::Ellipsis);
            items.extend((total - 4..=total).map(PageItem::Page));
        } else {
            items.push(PageItem::Page(1));
            items.push(PageItem::Ellipsis);
            items.extend((current - 1..=current + 1).map(PageItem::Page));
            items.push(PageItem::Ellipsis);
            items.push(PageItem::Page(total));
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_derive_last_partial_page() {
        let window = PageWindow::derive(13, 6, 3);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.start_index, 12);
        assert_eq!(window.end_index, 18);

        let items: Vec<usize> = (0..13).collect();
        assert_eq!(window.slice(&items), &[12]);
    }

    #[rstest]
    #[case(0, 6, 0)]
    #[case(1, 6, 1)]
    #[case(6, 6, 1)]
    #[case(7, 6, 2)]
    #[case(12, 6, 2)]
    #[case(100, 1, 100)]
    fn test_total_pages(#[case] total: usize, #[case] per_page: usize, #[case] expected: usize) {
        assert_eq!(PageWindow::derive(total, per_page, 1).total_pages, expected);
    }

    #[test]
    fn test_every_page_is_full_except_last() {
        let items: Vec<u32> = (0..23).collect();
        let per_page = 5;
        let total_pages = PageWindow::derive(items.len(), per_page, 1).total_pages;

        for page in 1..=total_pages {
            let window = PageWindow::derive(items.len(), per_page, page);
            let expected = if page == total_pages {
                items.len() - (total_pages - 1) * per_page
            } else {
                per_page
            };
            assert_eq!(window.slice(&items).len(), expected, "page {page}");
        }
    }

    #[test]
    fn test_derive_is_idempotent() {
        assert_eq!(PageWindow::derive(42, 6, 4), PageWindow::derive(42, 6, 4));
    }

    #[test]
    fn test_out_of_range_page_yields_empty_slice() {
        let items: Vec<u8> = (0..13).collect();
        let window = PageWindow::derive(items.len(), 6, 9);
        assert!(window.is_out_of_range());
        assert!(window.slice(&items).is_empty());
        assert_eq!(window.current_page, 9);
    }

    #[test]
    fn test_empty_list() {
        let window = PageWindow::derive(0, 6, 1);
        assert_eq!(window.total_pages, 0);
        assert!(window.slice::<u8>(&[]).is_empty());
        assert!(!window.shows_controls());
        assert!(!window.has_next());
        assert!(window.visible_pages().is_empty());
    }

    #[test]
    fn test_previous_next_flags() {
        let first = PageWindow::derive(30, 10, 1);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = PageWindow::derive(30, 10, 3);
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn test_single_page_hides_controls() {
        assert!(!PageWindow::derive(6, 6, 1).shows_controls());
        assert!(PageWindow::derive(7, 6, 1).shows_controls());
    }

    #[rstest]
    #[case(5, 3, vec![Page(1), Page(2), Page(3), Page(4), Page(5)])]
    #[case(20, 2, vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(20)])]
    #[case(20, 4, vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(20)])]
    #[case(20, 17, vec![Page(1), Ellipsis, Page(16), Page(17), Page(18), Page(19), Page(20)])]
    #[case(20, 10, vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)])]
    fn test_visible_pages(
        #[case] total_pages: usize,
        #[case] current: usize,
        #[case] expected: Vec<PageItem>,
    ) {
        let window = PageWindow::derive(total_pages * 10, 10, current);
        assert_eq!(window.visible_pages(), expected);
    }
}
