#![forbid(unsafe_code)]

use std::sync::Arc;

use assetview_api::{fetch_media, AssetApi};
use assetview_core::AssetType;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::model::{Thumbnail, ThumbnailSlot};

/// Fire-and-forget thumbnail fetch writing into `slot` only. Without a runtime the card keeps
/// an empty slot.
pub(crate) fn spawn_thumbnail(api: Arc<dyn AssetApi>, kind: AssetType, id: u64, slot: ThumbnailSlot) -> Option<JoinHandle<()>> {
    let Ok(rt) = tokio::runtime::Handle::try_current() else {
        debug!(kind = %kind, id, "no runtime; thumbnail skipped");
        return None;
    };
    Some(rt.spawn(async move {
        let blob = fetch_media(api.as_ref(), kind, id).await;
        let thumb = Thumbnail::from_blob(&blob);
        let outcome = if thumb.placeholder { "placeholder" } else { "ok" };
        metrics::counter!("thumbnail_fetch_total", 1u64, "outcome" => outcome);
        if !slot.fill(thumb) {
            debug!(kind = %kind, id, "thumbnail slot already filled");
        }
    }))
}
