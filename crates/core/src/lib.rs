//! Asset catalogue core types shared by the search pipeline and its frontends.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub mod link;
pub mod query;
pub mod state;

pub use link::LinkState;
pub use query::{normalize_query, Tokens};
pub use state::{PageSize, PageState, SortState};

/// Asset category served by the backend. The set is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetType {
    AssetBundle,
    Resource,
}

impl AssetType {
    pub const ALL: [AssetType; 2] = [AssetType::AssetBundle, AssetType::Resource];

    /// Canonical display name. Category precedence is the lexicographic order of this string.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            AssetType::AssetBundle => "AssetBundle",
            AssetType::Resource => "Resource",
        }
    }

    /// Lowercase form used in API and detail-view paths.
    pub fn path_segment(&self) -> &'static str {
        match self {
            AssetType::AssetBundle => "assetbundle",
            AssetType::Resource => "resource",
        }
    }

    /// Accepts either the canonical name or the path segment, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.canonical_name().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// One search hit as returned by `/api/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: AssetType,
    pub id: u64,
    pub name: String,
    /// Opaque media reference, forwarded to renderers untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl Entry {
    pub fn new(kind: AssetType, id: u64, name: impl Into<String>) -> Self {
        Self { kind, id, name: name.into(), cover: None }
    }

    /// `"AssetBundle #12"`
    pub fn label(&self) -> String {
        format!("{} #{}", self.kind, self.id)
    }

    /// Image assets get a thumbnail on their card.
    pub fn is_image(&self) -> bool {
        self.name.starts_with("img_")
    }

    pub fn detail_path(&self) -> String {
        format!("/view/{}/{}", self.kind.path_segment(), self.id)
    }
}

pub mod prelude {
    pub use super::{normalize_query, AssetType, Entry, LinkState, PageSize, PageState, SortState, Tokens};
}
