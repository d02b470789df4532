#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use assetview_core::{AssetType, Entry};
use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{AssetApi, AssetError, AssetResult, ManifestSummary, MediaBlob, ObjectInfo};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Backend location and client knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// `None` keeps the HTTP client's default behaviour.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self { Self { base_url: DEFAULT_API_BASE.to_string(), timeout: None } }
}

impl ApiConfig {
    /// Reads `ASSETVIEW_API_BASE` and `ASSETVIEW_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ASSETVIEW_API_BASE").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout = std::env::var("ASSETVIEW_HTTP_TIMEOUT_SECS").ok().and_then(|s| s.parse::<u64>().ok()).filter(|s| *s > 0).map(Duration::from_secs);
        Self { base_url, timeout }
    }

    pub fn with_base(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// REST client for the catalogue backend.
pub struct HttpApi {
    client: reqwest::Client,
    base: String,
}

// Shape of `/api/manifest`; only the revision and list lengths are kept.
#[derive(Deserialize)]
struct ManifestWire {
    revision: serde_json::Value,
    #[serde(rename = "assetBundleList", default)]
    asset_bundles: Vec<IgnoredAny>,
    #[serde(rename = "resourceList", default)]
    resources: Vec<IgnoredAny>,
}

// The backend answers unknown objects with `200 {"error": "..."}`.
#[derive(Deserialize)]
struct ErrorWire {
    error: String,
}

fn render_revision(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(parts) if parts.len() == 2 => format!("{} (base {})", parts[0], parts[1]),
        other => other.to_string(),
    }
}

impl HttpApi {
    pub fn new(cfg: &ApiConfig) -> AssetResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = cfg.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(|e| AssetError::Internal(e.to_string()))?;
        Ok(Self { client, base: cfg.base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str { &self.base }

    fn map_transport(e: reqwest::Error) -> AssetError { AssetError::Transport(e.to_string()) }

    async fn get_ok(&self, url: &str, query: Option<(&str, &str)>) -> AssetResult<reqwest::Response> {
        let mut req = self.client.get(url);
        if let Some(q) = query {
            req = req.query(&[q]);
        }
        let resp = req.send().await.map_err(Self::map_transport)?;
        let status = resp.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "api: non-success status");
            return Err(AssetError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl AssetApi for HttpApi {
    async fn search(&self, query: &str) -> AssetResult<Vec<Entry>> {
        let t0 = Instant::now();
        let url = format!("{}/api/search", self.base);
        info!(query = %query, "api: search start");
        let resp = self.get_ok(&url, Some(("query", query))).await?;
        let entries: Vec<Entry> = resp.json().await.map_err(|e| AssetError::Decode(e.to_string()))?;
        info!(count = entries.len(), took_ms = %t0.elapsed().as_millis(), "api: search ok");
        Ok(entries)
    }

    async fn bytestream(&self, kind: AssetType, id: u64) -> AssetResult<MediaBlob> {
        let t0 = Instant::now();
        let url = format!("{}/api/{}/{}/bytestream", self.base, kind.path_segment(), id);
        let resp = self.get_ok(&url, None).await?;
        let mimetype = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = resp.bytes().await.map_err(Self::map_transport)?.to_vec();
        if mimetype.starts_with("application/json") {
            if let Ok(ErrorWire { error }) = serde_json::from_slice::<ErrorWire>(&bytes) {
                return Err(AssetError::NotFound(format!("{} #{}: {}", kind, id, error)));
            }
        }
        info!(kind = %kind, id, mimetype = %mimetype, bytes = bytes.len(), took_ms = %t0.elapsed().as_millis(), "api: bytestream ok");
        Ok(MediaBlob { mimetype, bytes })
    }

    async fn manifest(&self) -> AssetResult<ManifestSummary> {
        let t0 = Instant::now();
        let url = format!("{}/api/manifest", self.base);
        let resp = self.get_ok(&url, None).await?;
        let wire: ManifestWire = resp.json().await.map_err(|e| AssetError::Decode(e.to_string()))?;
        let summary = ManifestSummary {
            revision: render_revision(&wire.revision),
            assetbundle_count: wire.asset_bundles.len(),
            resource_count: wire.resources.len(),
        };
        info!(revision = %summary.revision, took_ms = %t0.elapsed().as_millis(), "api: manifest ok");
        Ok(summary)
    }

    async fn object(&self, kind: AssetType, id: u64) -> AssetResult<ObjectInfo> {
        let t0 = Instant::now();
        let url = format!("{}/api/{}/{}", self.base, kind.path_segment(), id);
        let resp = self.get_ok(&url, None).await?;
        let body: serde_json::Value = resp.json().await.map_err(|e| AssetError::Decode(e.to_string()))?;
        if let Ok(ErrorWire { error }) = ErrorWire::deserialize(&body) {
            return Err(AssetError::NotFound(format!("{} #{}: {}", kind, id, error)));
        }
        let info: ObjectInfo = serde_json::from_value(body).map_err(|e| AssetError::Decode(e.to_string()))?;
        info!(kind = %kind, id, name = %info.name, took_ms = %t0.elapsed().as_millis(), "api: object ok");
        Ok(info)
    }

    async fn caption(&self, kind: AssetType, id: u64) -> AssetResult<String> {
        let url = format!("{}/api/{}/{}/caption", self.base, kind.path_segment(), id);
        let resp = self.get_ok(&url, None).await?;
        resp.text().await.map_err(Self::map_transport)
    }
}
