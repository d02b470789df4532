//! Asset catalogue backend API façade.
//!
//! Frontends depend on the [`AssetApi`] trait only. [`HttpApi`] talks to the REST backend,
//! [`MockApi`] serves canned data for tests.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assetview_core::{AssetType, Entry};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod http;

pub use http::{ApiConfig, HttpApi};

/// API errors; serializable so they can be shown or logged as structured data.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssetError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("decode: {0}")]
    Decode(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// Binary payload from the bytestream endpoint plus its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

impl MediaBlob {
    pub fn new(mimetype: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { mimetype: mimetype.into(), bytes: bytes.into() }
    }

    /// Stand-in payload used when a fetch fails.
    pub fn placeholder(reason: &str) -> Self {
        Self::new("text/plain", format!("[media unavailable: {}]", reason))
    }

    pub fn is_image(&self) -> bool {
        self.mimetype.starts_with("image/")
    }

    /// Self-contained `data:` URL usable as an image/audio source.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mimetype, base64::engine::general_purpose::STANDARD.encode(&self.bytes))
    }
}

/// Home-page level numbers about the served manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestSummary {
    pub revision: String,
    pub assetbundle_count: usize,
    pub resource_count: usize,
}

/// Backend surface used by the search page.
/// Another object an asset bundle needs; the name is filled in when the backend resolves it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectDependency {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectDependency {
    pub fn detail_path(&self) -> String { format!("/view/{}/{}", AssetType::AssetBundle.path_segment(), self.id) }
}

// Dependencies arrive either as bare ids or as `{id, name}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyWire {
    Id(u64),
    Full(ObjectDependency),
}

fn de_dependencies<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Vec<ObjectDependency>, D::Error> {
    let wire: Option<Vec<DependencyWire>> = Option::deserialize(d)?;
    Ok(wire
        .unwrap_or_default()
        .into_iter()
        .map(|w| match w {
            DependencyWire::Id(id) => ObjectDependency { id, name: None },
            DependencyWire::Full(dep) => dep,
        })
        .collect())
}

/// Metadata shown on an object's detail view (`GET /api/{type}/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectInfo {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, rename = "objectName", skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    /// Last-modified time as the backend formats it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
    #[serde(default, deserialize_with = "de_dependencies", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ObjectDependency>,
}

impl ObjectInfo {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), size: None, crc: None, md5: None, object_name: None, mtime: None, dependencies: Vec::new() }
    }
}

#[async_trait::async_trait]
pub trait AssetApi: Send + Sync {
    /// `GET /api/search?query=...`
    async fn search(&self, query: &str) -> AssetResult<Vec<Entry>>;

    /// `GET /api/{type}/{id}/bytestream`
    async fn bytestream(&self, kind: AssetType, id: u64) -> AssetResult<MediaBlob>;

    /// `GET /api/manifest`, reduced to a summary.
    async fn manifest(&self) -> AssetResult<ManifestSummary>;

    /// `GET /api/{type}/{id}`
    async fn object(&self, kind: AssetType, id: u64) -> AssetResult<ObjectInfo>;

    /// `GET /api/{type}/{id}/caption`, plain text.
    async fn caption(&self, kind: AssetType, id: u64) -> AssetResult<String>;
}

/// Media fetch that never fails: errors become a `text/plain` placeholder payload.
pub async fn fetch_media(api: &dyn AssetApi, kind: AssetType, id: u64) -> MediaBlob {
    match api.bytestream(kind, id).await {
        Ok(blob) => {
            metrics::counter!("media_fetch_total", 1u64, "outcome" => "ok");
            blob
        }
        Err(e) => {
            metrics::counter!("media_fetch_total", 1u64, "outcome" => "error");
            debug!(kind = %kind, id, error = %e, "media fetch failed; using placeholder");
            MediaBlob::placeholder(&e.to_string())
        }
    }
}

// ----------------- Mock implementation -----------------

/// Simple in-memory mock implementation for tests.
#[derive(Default)]
pub struct MockApi {
    pub entries: Vec<Entry>,
    pub search_error: Option<AssetError>,
    pub blobs: HashMap<(AssetType, u64), MediaBlob>,
    /// Artificial latency per media item.
    pub delays: HashMap<(AssetType, u64), Duration>,
    pub manifest: Option<ManifestSummary>,
    pub objects: HashMap<(AssetType, u64), ObjectInfo>,
    pub captions: HashMap<(AssetType, u64), String>,
    search_calls: AtomicUsize,
    media_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self { Self::default() }

    pub fn with_entries(entries: Vec<Entry>) -> Self { Self { entries, ..Self::default() } }

    pub fn failing(err: AssetError) -> Self { Self { search_error: Some(err), ..Self::default() } }

    pub fn search_calls(&self) -> usize { self.search_calls.load(Ordering::SeqCst) }

    pub fn media_calls(&self) -> usize { self.media_calls.load(Ordering::SeqCst) }
}

#[async_trait::async_trait]
impl AssetApi for MockApi {
    async fn search(&self, _query: &str) -> AssetResult<Vec<Entry>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match &self.search_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.entries.clone()),
        }
    }

    async fn bytestream(&self, kind: AssetType, id: u64) -> AssetResult<MediaBlob> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delays.get(&(kind, id)) {
            tokio::time::sleep(*d).await;
        }
        self.blobs.get(&(kind, id)).cloned().ok_or_else(|| AssetError::NotFound(format!("{} #{}", kind, id)))
    }

    async fn manifest(&self) -> AssetResult<ManifestSummary> {
        self.manifest.clone().ok_or_else(|| AssetError::NotFound("no manifest configured".into()))
    }

    async fn object(&self, kind: AssetType, id: u64) -> AssetResult<ObjectInfo> {
        self.objects.get(&(kind, id)).cloned().ok_or_else(|| AssetError::NotFound(format!("{} #{}", kind, id)))
    }

    async fn caption(&self, kind: AssetType, id: u64) -> AssetResult<String> {
        self.captions.get(&(kind, id)).cloned().ok_or_else(|| AssetError::NotFound(format!("caption for {} #{}", kind, id)))
    }
}
