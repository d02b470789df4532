//! Detail view for one object: metadata table, embedded media and caption.

#![forbid(unsafe_code)]

use std::fmt::Write as _;

use assetview_api::{AssetApi, AssetResult, ObjectInfo};
use assetview_core::AssetType;
use serde::Serialize;
use tracing::{debug, info};

use crate::render::html_escape;

/// Fetched payload, ready to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Media {
    pub mimetype: String,
    pub size: usize,
    /// `data:` URL of the payload.
    pub src: String,
}

impl Media {
    /// `image`, `audio`, `video`, `text` or anything else the mimetype leads with.
    pub fn family(&self) -> &str {
        self.mimetype.split('/').next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub kind: AssetType,
    pub id: u64,
    /// `"AssetBundle #12"`
    pub title: String,
    pub info: ObjectInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

pub const CAPTION_UNAVAILABLE: &str = "[An error occurred while generating caption.]";

/// Message shown when the object itself cannot be loaded.
pub fn not_found_message(kind: AssetType, id: u64) -> String {
    format!("{} #{} cannot be found, or the backend failed to parse it.", kind, id)
}

/// Object metadata is required; media and caption are fetched concurrently and degrade on their own.
pub async fn load_detail(api: &dyn AssetApi, kind: AssetType, id: u64) -> AssetResult<DetailView> {
    let info = api.object(kind, id).await?;
    let (blob, caption) = futures::join!(api.bytestream(kind, id), api.caption(kind, id));
    let media = match blob {
        Ok(b) => Some(Media { mimetype: b.mimetype.clone(), size: b.bytes.len(), src: b.data_url() }),
        Err(e) => {
            debug!(kind = %kind, id, error = %e, "detail: media unavailable");
            None
        }
    };
    let caption = match caption {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(kind = %kind, id, error = %e, "detail: caption unavailable");
            None
        }
    };
    let outcome = if media.is_some() { "ok" } else { "no_media" };
    metrics::counter!("detail_fetch_total", 1u64, "outcome" => outcome);
    info!(kind = %kind, id, name = %info.name, media = media.is_some(), caption = caption.is_some(), "detail ready");
    Ok(DetailView { kind, id, title: format!("{} #{}", kind, id), info, media, caption })
}

impl DetailView {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let i = &self.info;
        let mut rows = Vec::new();
        if let Some(size) = i.size {
            rows.push(("Size", size.to_string()));
        }
        if let Some(crc) = i.crc {
            rows.push(("CRC", crc.to_string()));
        }
        if let Some(md5) = &i.md5 {
            rows.push(("MD5", md5.clone()));
        }
        if let Some(obj) = &i.object_name {
            rows.push(("Object", obj.clone()));
        }
        if let Some(mtime) = &i.mtime {
            rows.push(("Modified", mtime.clone()));
        }
        rows
    }

    pub fn to_text(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "{}  {}", self.title, self.info.name);
        for (k, v) in self.rows() {
            let _ = writeln!(s, "  {:<10} {}", k, v);
        }
        match &self.media {
            Some(m) => {
                let _ = writeln!(s, "  {:<10} {} ({} bytes)", "Media", m.mimetype, m.size);
            }
            None => {
                let _ = writeln!(s, "  {:<10} unavailable", "Media");
            }
        }
        if !self.info.dependencies.is_empty() {
            let _ = writeln!(s, "  Dependencies:");
            for d in &self.info.dependencies {
                let _ = writeln!(s, "    - {} {}", d.name.as_deref().unwrap_or("?"), d.detail_path());
            }
        }
        let _ = writeln!(s, "  Caption: {}", self.caption.as_deref().unwrap_or(CAPTION_UNAVAILABLE));
        s
    }

    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(1024);
        let _ = writeln!(out, "<h1>{}</h1>\n<h2>{}</h2>", html_escape(&self.title), html_escape(&self.info.name));
        if let Some(m) = &self.media {
            let src = html_escape(&m.src);
            let _ = match m.family() {
                "image" => writeln!(out, "<img src=\"{}\" alt=\"\">", src),
                "audio" => writeln!(out, "<audio src=\"{}\" controls></audio>", src),
                "video" => writeln!(out, "<video src=\"{}\" controls></video>", src),
                "text" => writeln!(out, "<iframe src=\"{}\"></iframe>", src),
                _ => writeln!(out, "<span>Unsupported content</span>"),
            };
        }
        out.push_str("<table class=\"properties\"><tbody>\n");
        for (k, v) in self.rows() {
            let _ = writeln!(out, "<tr><th>{}</th><td>{}</td></tr>", k, html_escape(&v));
        }
        if !self.info.dependencies.is_empty() {
            out.push_str("<tr><th>Dependencies</th><td><ul>");
            for d in &self.info.dependencies {
                let label = d.name.clone().unwrap_or_else(|| d.id.to_string());
                let _ = write!(out, "<li><a href=\"{}\">{}</a></li>", html_escape(&d.detail_path()), html_escape(&label));
            }
            out.push_str("</ul></td></tr>\n");
        }
        out.push_str("</tbody></table>\n");
        let _ = writeln!(
            out,
            "<p class=\"caption\">{}</p>",
            html_escape(self.caption.as_deref().unwrap_or(CAPTION_UNAVAILABLE))
        );
        out
    }
}
