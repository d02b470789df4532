//! Sort and pagination state owned by the search controller.

#![forbid(unsafe_code)]

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Ordering requested by the user. Default matches the backend: name, ascending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SortState {
    pub by_id: bool,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self { Self { by_id: false, ascending: true } }
}

impl SortState {
    pub fn by_name(ascending: bool) -> Self { Self { by_id: false, ascending } }
    pub fn by_id(ascending: bool) -> Self { Self { by_id: true, ascending } }
}

/// Entries per page, always one of `MIN, MIN+STEP, ..., MAX`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub const MIN: usize = 12;
    pub const STEP: usize = 12;
    pub const MAX: usize = 96;

    /// Clamp into `[MIN, MAX]` and snap down to the step grid.
    pub fn new(n: usize) -> Self {
        let c = n.clamp(Self::MIN, Self::MAX);
        Self(c - (c - Self::MIN) % Self::STEP)
    }

    pub fn get(self) -> usize { self.0 }

    pub fn steps() -> impl Iterator<Item = PageSize> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP).map(PageSize)
    }

    pub fn larger(self) -> Self { Self::new(self.0 + Self::STEP) }

    pub fn smaller(self) -> Self { Self::new(self.0.saturating_sub(Self::STEP)) }
}

impl Default for PageSize {
    fn default() -> Self { Self(Self::MIN) }
}

impl From<usize> for PageSize {
    fn from(n: usize) -> Self { Self::new(n) }
}

impl From<PageSize> for usize {
    fn from(p: PageSize) -> usize { p.0 }
}

/// Current page, page size and page count for one result set.
///
/// Invariant: `1 <= current_page <= max(total_pages, 1)`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageState {
    current_page: usize,
    page_size: PageSize,
    total_pages: usize,
}

impl Default for PageState {
    fn default() -> Self { Self::new(PageSize::default()) }
}

impl PageState {
    pub fn new(page_size: PageSize) -> Self {
        Self { current_page: 1, page_size, total_pages: 0 }
    }

    /// `ceil(count / size)`, zero for an empty set.
    pub fn total_pages_for(count: usize, page_size: PageSize) -> usize {
        count.div_ceil(page_size.get())
    }

    pub fn current_page(&self) -> usize { self.current_page }
    pub fn page_size(&self) -> PageSize { self.page_size }
    pub fn total_pages(&self) -> usize { self.total_pages }

    fn last_valid_page(&self) -> usize { self.total_pages.max(1) }

    /// Recompute the page count for `count` entries, clamping the current page.
    pub fn set_count(&mut self, count: usize) {
        self.total_pages = Self::total_pages_for(count, self.page_size);
        self.current_page = self.current_page.clamp(1, self.last_valid_page());
    }

    /// Move to `page` (clamped). Returns whether the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        let next = page.clamp(1, self.last_valid_page());
        let changed = next != self.current_page;
        self.current_page = next;
        changed
    }

    /// Change the page size. `reset_page` sends the user back to page 1; initial loads pass
    /// `false` to keep a page restored from a link.
    pub fn set_page_size(&mut self, size: PageSize, count: usize, reset_page: bool) -> bool {
        let changed = size != self.page_size;
        self.page_size = size;
        if reset_page && changed {
            self.current_page = 1;
        }
        self.set_count(count);
        changed
    }

    /// Slice bounds of the current page inside a store of `count` entries.
    pub fn range(&self, count: usize) -> Range<usize> {
        let size = self.page_size.get();
        let start = ((self.current_page - 1) * size).min(count);
        let end = (self.current_page * size).min(count);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_snaps_to_grid() {
        assert_eq!(PageSize::new(0).get(), 12);
        assert_eq!(PageSize::new(12).get(), 12);
        assert_eq!(PageSize::new(30).get(), 24);
        assert_eq!(PageSize::new(36).get(), 36);
        assert_eq!(PageSize::new(10_000).get(), 96);
        assert_eq!(PageSize::steps().count(), 8);
        assert_eq!(PageSize::default().smaller().get(), 12);
        assert_eq!(PageSize::new(96).larger().get(), 96);
    }

    #[test]
    fn total_pages_rounds_up() {
        let s = PageSize::new(12);
        assert_eq!(PageState::total_pages_for(0, s), 0);
        assert_eq!(PageState::total_pages_for(1, s), 1);
        assert_eq!(PageState::total_pages_for(12, s), 1);
        assert_eq!(PageState::total_pages_for(25, s), 3);
    }

    #[test]
    fn current_page_stays_in_bounds() {
        let mut p = PageState::default();
        p.set_count(0);
        assert_eq!(p.current_page(), 1);
        assert!(!p.set_page(5));
        p.set_count(25);
        assert!(p.set_page(3));
        assert!(!p.set_page(99));
        assert_eq!(p.current_page(), 3);
        assert_eq!(p.range(25), 24..25);
    }

    #[test]
    fn page_size_change_resets_unless_opted_out() {
        let mut p = PageState::default();
        p.set_count(100);
        p.set_page(4);
        p.set_page_size(PageSize::new(24), 100, true);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 5);

        p.set_page(4);
        p.set_page_size(PageSize::new(48), 100, false);
        // 100 / 48 -> 3 pages, page 4 is clamped rather than reset
        assert_eq!(p.current_page(), 3);
    }
}
