//! Asset search pipeline over an already-fetched result set.
//! Everything here is pure and synchronous: sort, slice into pages, build nav controls, highlight.

#![forbid(unsafe_code)]

pub mod collate;
pub mod highlight;
pub mod paginate;
pub mod sort;

pub use collate::{compare_names, NameCollator};
pub use highlight::{highlight, Highlighter, Segment};
pub use paginate::{nav_controls, paginate, NavItem, NavTarget, Page, DEFAULT_CONTEXT_RADIUS};
pub use sort::sort_entries;
