//! Image-URL resolution seam.
//!
//! Every variant ends up as one call to [`ImageService::image_url`]: a
//! pure function from `(asset, resize parameters)` to a URL string. The
//! actual resizing, encoding, and any background pre-warming of variants
//! belong to whatever stands behind the URL; this crate only promises
//! that identical inputs produce identical URLs, so HTTP-level caches
//! can key on them.
//!
//! [`QueryUrlService`] is the stock implementation: it appends the
//! resize parameters as query-string values plus a SHA-256 cache-key
//! parameter derived from the canonical parameter string.

use crate::asset::AssetRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Image-service cropping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fit {
    /// Crop around the focal point while preserving target dimensions.
    CropFocal,
    Crop,
    Contain,
}

impl Fit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fit::CropFocal => "crop_focal",
            Fit::Crop => "crop",
            Fit::Contain => "contain",
        }
    }
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one resize request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizeParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub fit: Option<Fit>,
}

impl ResizeParams {
    /// Canonical `key=value` form, fixed order. This string is the
    /// deterministic identity of the request and feeds the cache key.
    pub fn canonical(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("w={w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("h={h}"));
        }
        if let Some(fm) = &self.format {
            parts.push(format!("fm={fm}"));
        }
        if let Some(fit) = self.fit {
            parts.push(format!("fit={fit}"));
        }
        parts.join("&")
    }
}

/// Turns a variant tuple into a URL against the external image service.
///
/// Implementations must be pure: no caching, no I/O, and the same URL
/// for the same `(asset, params)` pair every time.
pub trait ImageService {
    fn image_url(&self, asset: &AssetRecord, params: &ResizeParams) -> String;
}

/// Stock [`ImageService`]: asset URL plus resize query parameters.
///
/// `base_url`, when set, is prepended to relative asset URLs so the CLI
/// can emit absolute links. The `s` parameter is the first 16 hex chars
/// of `SHA-256(url "?" canonical-params)` — a stable variant key, not a
/// signature.
#[derive(Debug, Clone, Default)]
pub struct QueryUrlService {
    pub base_url: Option<String>,
}

impl QueryUrlService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }

    fn absolute(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
            }
            _ => url.to_string(),
        }
    }
}

impl ImageService for QueryUrlService {
    fn image_url(&self, asset: &AssetRecord, params: &ResizeParams) -> String {
        let url = self.absolute(&asset.url);
        let query = params.canonical();
        if query.is_empty() {
            return url;
        }
        let key = variant_key(&url, &query);
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{url}{sep}{query}&s={key}")
    }
}

/// Deterministic variant key: truncated SHA-256 over URL and parameters.
fn variant_key(url: &str, canonical_params: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"?");
    hasher.update(canonical_params.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{digest:x}");
    hex[..16].to_string()
}
