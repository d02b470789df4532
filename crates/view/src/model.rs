#![forbid(unsafe_code)]

use std::sync::Arc;

use assetview_api::MediaBlob;
use assetview_core::{AssetType, PageState, SortState};
use assetview_search::{NavItem, Segment};
use once_cell::sync::OnceCell;
use serde::{Serialize, Serializer};

/// Gray rectangle shown where an image cannot be displayed.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;charset=UTF-8,<svg xmlns='http://www.w3.org/2000/svg' width='100%' height='100%'><rect width='100%' height='100%' fill='%23dddddd'/></svg>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub src: String,
    pub mimetype: String,
    pub placeholder: bool,
}

impl Thumbnail {
    /// Image payloads become a data URL; anything else (including fetch failures) the placeholder.
    pub fn from_blob(blob: &MediaBlob) -> Self {
        if blob.is_image() {
            Self { src: blob.data_url(), mimetype: blob.mimetype.clone(), placeholder: false }
        } else {
            Self { src: PLACEHOLDER_IMAGE.to_string(), mimetype: blob.mimetype.clone(), placeholder: true }
        }
    }
}

/// Write-once cell owned by a single card. Filled by that card's thumbnail task only.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailSlot(Arc<OnceCell<Thumbnail>>);

impl ThumbnailSlot {
    pub fn get(&self) -> Option<&Thumbnail> { self.0.get() }

    pub fn is_ready(&self) -> bool { self.0.get().is_some() }

    pub(crate) fn fill(&self, t: Thumbnail) -> bool { self.0.set(t).is_ok() }
}

impl Serialize for ThumbnailSlot {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(s)
    }
}

/// One result card.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub kind: AssetType,
    pub id: u64,
    /// `"AssetBundle #12"`
    pub label: String,
    pub name: String,
    pub name_segments: Vec<Segment>,
    /// Name with `<mark>` around query matches.
    pub name_markup: String,
    /// Detail view this card navigates to.
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub title: String,
    pub digest: String,
    pub total_entries: usize,
    pub sort: SortState,
    pub page: PageState,
    pub cards: Vec<Card>,
    pub nav: Vec<NavItem>,
    pub link: String,
}

/// Everything a renderer needs to replace the result list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ResultView {
    Loading { title: String },
    Failed { title: String, message: String },
    Empty { title: String, digest: String },
    Page(PageView),
}

impl ResultView {
    pub fn title(&self) -> &str {
        match self {
            ResultView::Loading { title } | ResultView::Failed { title, .. } | ResultView::Empty { title, .. } => title,
            ResultView::Page(p) => &p.title,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ResultView::Loading { .. } => "loading",
            ResultView::Failed { .. } => "failed",
            ResultView::Empty { .. } => "empty",
            ResultView::Page(_) => "page",
        }
    }

    pub fn as_page(&self) -> Option<&PageView> {
        match self {
            ResultView::Page(p) => Some(p),
            _ => None,
        }
    }
}

pub(crate) fn title_for(query: &str) -> String {
    format!("Search results for \"{}\"", query)
}

pub(crate) const NO_RESULTS: &str = "No results found.";

pub(crate) fn digest_for(count: usize) -> String {
    match count {
        0 => NO_RESULTS.to_string(),
        1 => "Found 1 entry.".to_string(),
        n => format!("Found {} entries.", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_wording() {
        assert_eq!(digest_for(0), "No results found.");
        assert_eq!(digest_for(1), "Found 1 entry.");
        assert_eq!(digest_for(25), "Found 25 entries.");
    }

    #[test]
    fn non_image_blob_falls_back_to_placeholder() {
        let t = Thumbnail::from_blob(&MediaBlob::placeholder("gone"));
        assert!(t.placeholder);
        assert_eq!(t.src, PLACEHOLDER_IMAGE);
        let ok = Thumbnail::from_blob(&MediaBlob::new("image/webp", vec![1u8]));
        assert!(ok.src.starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn slot_fills_once() {
        let s = ThumbnailSlot::default();
        let shared = s.clone();
        assert!(!s.is_ready());
        assert!(shared.fill(Thumbnail::from_blob(&MediaBlob::placeholder("a"))));
        assert!(!shared.fill(Thumbnail::from_blob(&MediaBlob::new("image/png", vec![0u8]))));
        assert!(s.get().map(|t| t.placeholder).unwrap_or(false));
        assert_eq!(serde_json::to_value(&s).unwrap()["placeholder"], serde_json::json!(true));
    }
}
