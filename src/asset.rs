//! Asset resolution seam.
//!
//! The compiler never touches storage itself; it asks an [`AssetStore`]
//! to turn an opaque reference (identifier, path, or URL) into an
//! [`AssetRecord`] carrying the facts rendering needs: the direct URL,
//! the mime type, intrinsic dimensions when known, and alt metadata.
//!
//! Two implementations ship with the crate: [`MemoryAssetStore`] for
//! tests and embedding applications that manage their own asset index,
//! and [`PathAssetStore`] for the CLI, which treats the reference itself
//! as the URL and infers the mime type from the file extension.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the compiler knows about one image asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Direct URL of the unmodified asset.
    pub url: String,
    /// Full mime type, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Intrinsic pixel width, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Intrinsic pixel height, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Alt text stored with the asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl AssetRecord {
    /// The mime subtype (`jpeg` from `image/jpeg`), lowercased.
    pub fn mime_subtype(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map(|(_, sub)| sub)
            .unwrap_or(&self.mime_type)
    }
}

/// Resolves opaque asset references to asset records.
pub trait AssetStore {
    /// Look up a reference; `None` means the asset does not exist.
    fn find(&self, reference: &str) -> Option<AssetRecord>;
}

/// Explicit reference → record map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: BTreeMap<String, AssetRecord>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, record: AssetRecord) {
        self.assets.insert(reference.into(), record);
    }
}

impl AssetStore for MemoryAssetStore {
    fn find(&self, reference: &str) -> Option<AssetRecord> {
        self.assets.get(reference).cloned()
    }
}

/// Treats the reference itself as the asset URL.
///
/// The mime type is inferred from the file extension; references without
/// a recognized image extension resolve to nothing. No intrinsic
/// dimensions or alt metadata are available through this store.
#[derive(Debug, Clone, Default)]
pub struct PathAssetStore;

impl AssetStore for PathAssetStore {
    fn find(&self, reference: &str) -> Option<AssetRecord> {
        let mime_type = mime_from_path(reference)?;
        Some(AssetRecord {
            url: reference.to_string(),
            mime_type,
            width: None,
            height: None,
            alt: None,
        })
    }
}

/// Infer an `image/*` mime type from a path or URL extension.
pub fn mime_from_path(path: &str) -> Option<String> {
    // Strip query string and fragment before looking at the extension
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let subtype = match ext.as_str() {
        "jpg" | "jpeg" => "jpeg",
        "png" => "png",
        "webp" => "webp",
        "avif" => "avif",
        "gif" => "gif",
        "svg" => "svg+xml",
        _ => return None,
    };
    Some(format!("image/{subtype}"))
}
