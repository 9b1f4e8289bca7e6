//! Shared test fixtures: a deterministic echo image service and a small
//! asset store. Test-only (`#[cfg(test)]` in lib.rs).

use crate::asset::{AssetRecord, MemoryAssetStore};
use crate::url::{ImageService, ResizeParams};

/// Image service that echoes its inputs into the URL, so tests can
/// assert exact strings without hashing.
pub struct EchoService;

impl ImageService for EchoService {
    fn image_url(&self, asset: &AssetRecord, params: &ResizeParams) -> String {
        let query = params.canonical();
        if query.is_empty() {
            format!("echo:{}", asset.url)
        } else {
            format!("echo:{}?{}", asset.url, query)
        }
    }
}

/// A plain jpeg asset with no metadata.
pub fn jpeg_asset() -> AssetRecord {
    AssetRecord {
        url: "/a.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        width: None,
        height: None,
        alt: None,
    }
}

/// Store with one processable asset (`hero`, jpeg with metadata) and one
/// the image service can't handle (`anim`, gif).
pub fn fixture_store() -> MemoryAssetStore {
    let mut store = MemoryAssetStore::new();
    store.insert(
        "hero",
        AssetRecord {
            url: "/assets/hero.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            width: Some(1600),
            height: Some(900),
            alt: Some("A sweeping valley".to_string()),
        },
    );
    store.insert(
        "anim",
        AssetRecord {
            url: "/assets/anim.gif".to_string(),
            mime_type: "image/gif".to_string(),
            width: Some(320),
            height: Some(240),
            alt: None,
        },
    );
    store
}
