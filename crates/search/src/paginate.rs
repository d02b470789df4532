//! Page slicing and page-navigation control synthesis.
//!
//! Control layout with context radius R = 1 (brackets mark the current page):
//!
//! ```text
//! Prev  [1]   2                 ...   N   Next
//! Prev   1   ...  I-1  [I]  I+1 ...   N   Next
//! Prev   1   ...        N-1        [N]    Next
//! ```

#![forbid(unsafe_code)]

use assetview_core::PageState;
use serde::Serialize;

pub const DEFAULT_CONTEXT_RADIUS: usize = 1;

/// One page of the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub entries: &'a [T],
    pub total_pages: usize,
}

/// Slice the current page out of `entries` according to `state`.
pub fn paginate<'a, T>(entries: &'a [T], state: &PageState) -> Page<'a, T> {
    let total_pages = PageState::total_pages_for(entries.len(), state.page_size());
    let range = state.range(entries.len());
    Page { entries: &entries[range], total_pages }
}

/// Where a navigation button leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum NavTarget {
    Prev,
    Page(usize),
    Next,
}

impl NavTarget {
    /// Page number reached from `current` (not clamped).
    pub fn resolve(self, current: usize) -> usize {
        match self {
            NavTarget::Prev => current.saturating_sub(1),
            NavTarget::Page(n) => n,
            NavTarget::Next => current + 1,
        }
    }

    pub fn label(self) -> String {
        match self {
            NavTarget::Prev => "Prev".to_string(),
            NavTarget::Page(n) => n.to_string(),
            NavTarget::Next => "Next".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavItem {
    Button { target: NavTarget, enabled: bool },
    Ellipsis,
}

impl NavItem {
    fn button(target: NavTarget, enabled: bool) -> Self { NavItem::Button { target, enabled } }

    pub fn label(&self) -> String {
        match self {
            NavItem::Button { target, .. } => target.label(),
            NavItem::Ellipsis => "...".to_string(),
        }
    }
}

/// Build the navigation row for `current` out of `total` pages with context `radius`.
pub fn nav_controls(current: usize, total: usize, radius: usize) -> Vec<NavItem> {
    let mut out = Vec::with_capacity(radius.saturating_mul(2).saturating_add(7).min(total.saturating_add(4)));
    out.push(NavItem::button(NavTarget::Prev, current > 1));
    out.push(NavItem::button(NavTarget::Page(1), current != 1));

    if total <= radius.saturating_mul(2).saturating_add(1) {
        for i in 2..=total {
            out.push(NavItem::button(NavTarget::Page(i), current != i));
        }
    } else {
        if current > radius.saturating_add(2) {
            out.push(NavItem::Ellipsis);
        }
        let start = current.saturating_sub(radius).max(2);
        let end = current.saturating_add(radius).min(total - 1);
        for i in start..=end {
            out.push(NavItem::button(NavTarget::Page(i), current != i));
        }
        if current.saturating_add(radius).saturating_add(1) < total {
            out.push(NavItem::Ellipsis);
        }
        out.push(NavItem::button(NavTarget::Page(total), current != total));
    }

    out.push(NavItem::button(NavTarget::Next, current < total && total > 0));
    out
}
