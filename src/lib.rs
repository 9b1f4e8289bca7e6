//! # Picturesque
//!
//! A responsive `<picture>` compiler. Given one image asset and a compact
//! size-descriptor string per breakpoint, it produces a deterministic set
//! of srcset variants and renders them as HTML or as an equivalent JSON
//! structure:
//!
//! ```text
//! options ──► plan ──► expand ──► RenderPlan ──► HTML / JSON
//!               │          │
//!          descriptor  ImageService (URL seam)
//! ```
//!
//! The hard part is the descriptor mini-language: `"300,600x200|16:9|100vw"`
//! compiles to concrete `(width, height, format, media-condition)` tuples,
//! multiplied out across configured size multipliers or device pixel
//! ratios, with duplicate widths dropped so no bytes are wasted on
//! variants the browser would never pick.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`descriptor`] | Size-descriptor mini-language parser (`"300,600x200\|16:9\|100vw"`) |
//! | [`plan`] | Breakpoint plan: ordered `(breakpoint, format)` entries, largest `min-width` first |
//! | [`expand`] | Srcset expansion: size multipliers / DPRs, width dedup |
//! | [`url`] | `ImageService` seam — variant tuple to deterministic URL |
//! | [`asset`] | `AssetStore` seam — opaque reference to asset record |
//! | [`render`] | `RenderPlan` to `<picture>` HTML (maud) or JSON (serde_json) |
//! | [`picture`] | `PictureOptions`, the recognized-options table, and `compile()` |
//! | [`config`] | `config.toml` loading, defaults, validation |
//!
//! # Design Decisions
//!
//! ## No Image Processing
//!
//! This crate never touches pixels. Resizing, encoding, and any
//! background pre-warming of variants live behind the
//! [`url::ImageService`] trait; the compiler only promises that the same
//! `(asset, parameters)` pair always yields the same URL. A URL may 404
//! until the service has produced the variant — eventual consistency is
//! the contract.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a
//! compile-time HTML macro system. Malformed markup is a build error,
//! interpolation is auto-escaped, and there is no template directory to
//! ship or get out of sync.
//!
//! ## Explicit Config Threading
//!
//! [`config::PictureConfig`] is loaded once and passed by reference into
//! every call — no global lookup, no locking. Render calls share nothing
//! mutable; all intermediate data is function-local, so concurrent
//! renders need no coordination.
//!
//! ## Whole-Render Failure
//!
//! A malformed descriptor or unknown breakpoint aborts the entire render
//! rather than emitting a partial `<picture>`. A broken srcset that
//! ships is much harder to notice than an error that doesn't.
//!
//! # Example
//!
//! ```
//! use picturesque::asset::{AssetRecord, MemoryAssetStore};
//! use picturesque::config::PictureConfig;
//! use picturesque::picture::{self, PictureOptions};
//! use picturesque::url::QueryUrlService;
//!
//! let config = PictureConfig::default();
//! let mut assets = MemoryAssetStore::new();
//! assets.insert("hero", AssetRecord {
//!     url: "/assets/hero.jpg".to_string(),
//!     mime_type: "image/jpeg".to_string(),
//!     width: Some(1600),
//!     height: Some(900),
//!     alt: Some("A sweeping valley".to_string()),
//! });
//!
//! let options = PictureOptions {
//!     size: Some("300".to_string()),
//!     breakpoints: vec![("md".to_string(), "720|16:9|100vw".to_string())],
//!     ..Default::default()
//! };
//! let html = picture::render(
//!     &config, &assets, &QueryUrlService::new(), "hero", &options,
//! ).unwrap();
//! assert!(html.starts_with("<picture>"));
//! ```

pub mod asset;
pub mod config;
pub mod descriptor;
pub mod expand;
pub mod picture;
pub mod plan;
pub mod render;
pub mod url;

#[cfg(test)]
pub(crate) mod test_helpers;
