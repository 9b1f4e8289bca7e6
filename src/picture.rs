//! Picture compilation — the top-level entry point.
//!
//! [`compile`] takes the process-wide config, the two collaborator seams
//! (asset store, image service), an asset reference, and an immutable
//! [`PictureOptions`] value, and produces a [`RenderPlan`]:
//!
//! ```text
//! options ──► build_plan ──► expand_srcset per entry ──► RenderPlan
//!                │                    │
//!            descriptor           ImageService
//!              parser
//! ```
//!
//! Options are constructed once, either directly or from a flat
//! `key=value` bag via [`PictureOptions::from_params`] (the shape
//! template tags and the CLI hand us). There is no builder and no
//! mutation after construction.
//!
//! Failure policy: a malformed descriptor or unknown breakpoint aborts
//! the whole render — shipping a `<picture>` with a partially broken
//! srcset is worse than shipping none. An unsupported *format* only
//! drops that format; an unsupported asset *file type* drops all
//! variants and falls back to the asset's direct URL.

use crate::asset::{AssetRecord, AssetStore};
use crate::config::PictureConfig;
use crate::descriptor::{DescriptorError, Orientation};
use crate::expand::expand_srcset;
use crate::plan::{self, PlanError};
use crate::render::{self, ImgEntry, RenderPlan, SourceEntry};
use crate::url::{Fit, ImageService, ResizeParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PictureError {
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error(transparent)]
    InvalidDescriptor(#[from] DescriptorError),
    #[error("unknown breakpoint: {0}")]
    UnknownBreakpoint(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PlanError> for PictureError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidDescriptor(e) => PictureError::InvalidDescriptor(e),
            PlanError::UnknownBreakpoint(name) => PictureError::UnknownBreakpoint(name),
        }
    }
}

/// Output form of a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Html,
    Json,
}

impl OutputMode {
    /// Parse an `output` option value. `array` is an alias for `json`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Some(Self::Html),
            "json" | "array" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Immutable per-call options.
///
/// Constructed once, passed by reference into [`compile`]. The
/// `breakpoints` field holds `(breakpoint name, descriptor string)`
/// pairs; `size` is the no-media-query default descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PictureOptions {
    /// Default (no media condition) size descriptor.
    pub size: Option<String>,
    /// Per-breakpoint size descriptors.
    pub breakpoints: Vec<(String, String)>,
    /// Requested output formats (mime subtypes), in priority order.
    /// Empty means the configured default format.
    pub formats: Vec<String>,
    pub orientation: Orientation,
    /// Explicit alt text; overrides the asset's own metadata.
    pub alt: Option<String>,
    /// Class for the fallback `<img>`.
    pub css_class: Option<String>,
    /// Class for the wrapping `<picture>`.
    pub wrapper_class: Option<String>,
    /// Lazy loading; `None` falls back to `config.lazy_loading`.
    pub lazy: Option<bool>,
    pub output: OutputMode,
}

impl PictureOptions {
    /// Build options from a flat `key=value` bag.
    ///
    /// Recognized keys: `src`/`id`/`path` (the asset reference, returned
    /// separately), `size`/`default`, any breakpoint name from the
    /// config, `format`/`filetype`/`filetypes` (comma-separated),
    /// `orientation`/`ori`, `alt`, `class`, `wrapper_class`/`wrapperClass`,
    /// `lazy`, `output`. Unrecognized keys are rejected — the same typo-safety
    /// posture as the config loader.
    pub fn from_params(
        config: &PictureConfig,
        params: &[(String, String)],
    ) -> Result<(String, Self), PictureError> {
        let mut src: Option<String> = None;
        let mut options = Self::default();

        for (key, value) in params {
            match key.as_str() {
                "src" | "id" | "path" => src = Some(value.clone()),
                "size" | "default" => options.size = Some(value.clone()),
                "format" | "filetype" | "filetypes" => {
                    options.formats = value
                        .split(',')
                        .map(|f| f.trim().to_ascii_lowercase())
                        .filter(|f| !f.is_empty())
                        .collect();
                }
                "orientation" | "ori" => {
                    options.orientation = Orientation::parse(value).ok_or_else(|| {
                        PictureError::InvalidOption(format!(
                            "orientation must be 'landscape' or 'portrait', got {value:?}"
                        ))
                    })?;
                }
                "alt" => options.alt = Some(value.clone()),
                "class" => options.css_class = Some(value.clone()),
                "wrapper_class" | "wrapperClass" => options.wrapper_class = Some(value.clone()),
                "lazy" => {
                    options.lazy = Some(parse_bool(value).ok_or_else(|| {
                        PictureError::InvalidOption(format!(
                            "lazy must be 'true' or 'false', got {value:?}"
                        ))
                    })?);
                }
                "output" => {
                    options.output = OutputMode::parse(value).ok_or_else(|| {
                        PictureError::InvalidOption(format!(
                            "output must be 'html', 'json' or 'array', got {value:?}"
                        ))
                    })?;
                }
                name if config.breakpoints.contains_key(name) => {
                    options
                        .breakpoints
                        .push((name.to_string(), value.clone()));
                }
                other => {
                    return Err(PictureError::InvalidOption(format!(
                        "unrecognized option {other:?}"
                    )));
                }
            }
        }

        let src = src.ok_or_else(|| {
            PictureError::InvalidOption("missing asset reference (src/id/path)".to_string())
        })?;
        Ok((src, options))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Compile one asset + option set into a [`RenderPlan`].
pub fn compile(
    config: &PictureConfig,
    assets: &dyn AssetStore,
    service: &dyn ImageService,
    reference: &str,
    options: &PictureOptions,
) -> Result<RenderPlan, PictureError> {
    let asset = assets
        .find(reference)
        .ok_or_else(|| PictureError::AssetNotFound(reference.to_string()))?;

    let img_common = ImgCommon::resolve(config, options, &asset);

    // File types the image service can't process fall back to the
    // unmodified asset: direct URL, zero sources.
    if !config.supports_filetype(asset.mime_subtype()) {
        return Ok(RenderPlan {
            sources: Vec::new(),
            img: img_common.into_entry(asset.url.clone(), &asset),
            wrapper_class: options.wrapper_class.clone(),
        });
    }

    let formats = resolve_formats(config, options)?;

    let entries = plan::build_plan(
        config,
        &options.breakpoints,
        &formats,
        options.size.as_deref(),
        options.orientation,
    )?;

    let sources: Vec<SourceEntry> = entries
        .iter()
        .map(|entry| SourceEntry {
            mime_type: format!("image/{}", entry.format),
            media: entry.media_condition(),
            srcset: expand_srcset(config, service, &asset, &entry.descriptor, &entry.format),
            sizes: entry.descriptor.sizes.clone(),
        })
        .collect();

    let img_src = service.image_url(
        &asset,
        &ResizeParams {
            width: Some(config.min_width),
            height: None,
            format: None,
            fit: Some(Fit::CropFocal),
        },
    );

    Ok(RenderPlan {
        sources,
        img: img_common.into_entry(img_src, &asset),
        wrapper_class: options.wrapper_class.clone(),
    })
}

/// Compile and render in one step, honoring `options.output`.
pub fn render(
    config: &PictureConfig,
    assets: &dyn AssetStore,
    service: &dyn ImageService,
    reference: &str,
    options: &PictureOptions,
) -> Result<String, PictureError> {
    let plan = compile(config, assets, service, reference, options)?;
    match options.output {
        OutputMode::Html => Ok(render::to_html(&plan)),
        OutputMode::Json => Ok(render::to_json(&plan)?),
    }
}

/// Validate the requested formats against the supported set.
///
/// An unsupported format is skipped (that format only); if nothing
/// survives there is nothing to render, which is an error.
fn resolve_formats(
    config: &PictureConfig,
    options: &PictureOptions,
) -> Result<Vec<String>, PictureError> {
    if options.formats.is_empty() {
        return Ok(vec![config.default_filetype.clone()]);
    }
    let supported: Vec<String> = options
        .formats
        .iter()
        .filter(|f| config.supports_filetype(f))
        .cloned()
        .collect();
    if supported.is_empty() {
        return Err(PictureError::UnsupportedFormat(
            options.formats[0].clone(),
        ));
    }
    Ok(supported)
}

/// `<img>` attributes shared by the supported and unsupported paths.
struct ImgCommon {
    alt: Option<String>,
    css_class: Option<String>,
    loading: Option<String>,
}

impl ImgCommon {
    fn resolve(config: &PictureConfig, options: &PictureOptions, asset: &AssetRecord) -> Self {
        let lazy = options.lazy.unwrap_or(config.lazy_loading);
        Self {
            alt: resolve_alt(config, options, asset),
            css_class: options
                .css_class
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            loading: lazy.then(|| "lazy".to_string()),
        }
    }

    fn into_entry(self, src: String, asset: &AssetRecord) -> ImgEntry {
        ImgEntry {
            src,
            alt: self.alt,
            css_class: self.css_class,
            loading: self.loading,
            width: asset.width,
            height: asset.height,
        }
    }
}

/// Alt resolution: caller option → asset metadata → none.
fn resolve_alt(
    config: &PictureConfig,
    options: &PictureOptions,
    asset: &AssetRecord,
) -> Option<String> {
    let raw = options.alt.as_deref().or(asset.alt.as_deref())?;
    let mut alt = strip_tags(raw).trim().to_string();
    if alt.is_empty() {
        return None;
    }
    if config.alt_fullstop && !alt.ends_with(['.', '!', '?']) {
        alt.push('.');
    }
    Some(alt)
}

/// Remove `<…>` tag sequences from alt text. Screen readers get prose,
/// not markup, even when the CMS field contains some.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{EchoService, fixture_store, jpeg_asset};

    fn config() -> PictureConfig {
        PictureConfig::default()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // =========================================================================
    // Option parsing
    // =========================================================================

    #[test]
    fn from_params_recognizes_the_full_table() {
        let (src, options) = PictureOptions::from_params(
            &config(),
            &params(&[
                ("src", "hero"),
                ("size", "300"),
                ("md", "600|2:1"),
                ("format", "webp, jpeg"),
                ("ori", "portrait"),
                ("alt", "A hero"),
                ("class", "pic"),
                ("wrapper_class", "stage"),
                ("lazy", "false"),
                ("output", "json"),
            ]),
        )
        .unwrap();
        assert_eq!(src, "hero");
        assert_eq!(options.size.as_deref(), Some("300"));
        assert_eq!(
            options.breakpoints,
            vec![("md".to_string(), "600|2:1".to_string())]
        );
        assert_eq!(options.formats, vec!["webp", "jpeg"]);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert_eq!(options.lazy, Some(false));
        assert_eq!(options.output, OutputMode::Json);
    }

    #[test]
    fn from_params_honors_aliases() {
        let (src, options) =
            PictureOptions::from_params(&config(), &params(&[("id", "x"), ("default", "300")]))
                .unwrap();
        assert_eq!(src, "x");
        assert_eq!(options.size.as_deref(), Some("300"));

        let (_, options) =
            PictureOptions::from_params(&config(), &params(&[("path", "x"), ("filetypes", "png")]))
                .unwrap();
        assert_eq!(options.formats, vec!["png"]);
    }

    #[test]
    fn from_params_rejects_unrecognized_keys() {
        let err = PictureOptions::from_params(&config(), &params(&[("src", "x"), ("sise", "300")]))
            .unwrap_err();
        assert!(matches!(err, PictureError::InvalidOption(_)));
    }

    #[test]
    fn from_params_requires_a_reference() {
        let err = PictureOptions::from_params(&config(), &params(&[("size", "300")])).unwrap_err();
        assert!(matches!(err, PictureError::InvalidOption(_)));
    }

    #[test]
    fn from_params_rejects_bad_scalar_values() {
        for (key, value) in [("lazy", "maybe"), ("output", "xml"), ("ori", "upside-down")] {
            let err =
                PictureOptions::from_params(&config(), &params(&[("src", "x"), (key, value)]))
                    .unwrap_err();
            assert!(matches!(err, PictureError::InvalidOption(_)), "{key}");
        }
    }

    #[test]
    fn output_mode_array_is_json() {
        assert_eq!(OutputMode::parse("array"), Some(OutputMode::Json));
        assert_eq!(OutputMode::parse("HTML"), Some(OutputMode::Html));
    }

    // =========================================================================
    // compile
    // =========================================================================

    #[test]
    fn compile_happy_path() {
        let options = PictureOptions {
            size: Some("300||100vw".to_string()),
            breakpoints: vec![("md".to_string(), "600".to_string())],
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap();

        // md source first, default source last
        assert_eq!(plan.sources.len(), 2);
        assert_eq!(
            plan.sources[0].media.as_deref(),
            Some("(min-width: 768px)")
        );
        assert_eq!(plan.sources[0].mime_type, "image/webp");
        assert!(plan.sources[0].srcset.contains(" 1x"));
        assert_eq!(plan.sources[1].media, None);
        assert_eq!(plan.sources[1].sizes.as_deref(), Some("100vw"));
        assert!(plan.sources[1].srcset.contains(" 300w"));

        // fallback img clamped to min_width with crop_focal, intrinsic dims
        assert!(plan.img.src.contains("w=300"));
        assert!(plan.img.src.contains("fit=crop_focal"));
        assert_eq!(plan.img.width, Some(1600));
        assert_eq!(plan.img.height, Some(900));
        assert_eq!(plan.img.loading.as_deref(), Some("lazy"));
    }

    #[test]
    fn compile_is_idempotent() {
        let options = PictureOptions {
            size: Some("300,600|16:9|100vw".to_string()),
            breakpoints: vec![("sm".to_string(), "200".to_string())],
            formats: vec!["webp".to_string(), "jpeg".to_string()],
            ..Default::default()
        };
        let store = fixture_store();
        let a = compile(&config(), &store, &EchoService, "hero", &options).unwrap();
        let b = compile(&config(), &store, &EchoService, "hero", &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            render::to_html(&a),
            render::to_html(&b)
        );
    }

    #[test]
    fn missing_asset_is_an_error() {
        let err = compile(
            &config(),
            &fixture_store(),
            &EchoService,
            "nope",
            &PictureOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PictureError::AssetNotFound(_)));
    }

    #[test]
    fn unsupported_filetype_renders_direct_url_only() {
        let options = PictureOptions {
            size: Some("300".to_string()),
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "anim", &options).unwrap();
        assert!(plan.sources.is_empty());
        // direct URL, no resize parameters
        assert_eq!(plan.img.src, "/assets/anim.gif");
    }

    #[test]
    fn unknown_breakpoint_propagates() {
        let options = PictureOptions {
            breakpoints: vec![("xxl".to_string(), "300".to_string())],
            ..Default::default()
        };
        let err =
            compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap_err();
        assert!(matches!(err, PictureError::UnknownBreakpoint(name) if name == "xxl"));
    }

    #[test]
    fn invalid_descriptor_propagates() {
        let options = PictureOptions {
            size: Some("|1:2".to_string()),
            ..Default::default()
        };
        let err =
            compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap_err();
        assert!(matches!(err, PictureError::InvalidDescriptor(_)));
    }

    #[test]
    fn unsupported_format_is_skipped_when_others_remain() {
        let options = PictureOptions {
            size: Some("300".to_string()),
            formats: vec!["avif".to_string(), "webp".to_string()],
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap();
        assert_eq!(plan.sources.len(), 1);
        assert_eq!(plan.sources[0].mime_type, "image/webp");
    }

    #[test]
    fn all_formats_unsupported_is_an_error() {
        let options = PictureOptions {
            size: Some("300".to_string()),
            formats: vec!["avif".to_string()],
            ..Default::default()
        };
        let err =
            compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap_err();
        assert!(matches!(err, PictureError::UnsupportedFormat(f) if f == "avif"));
    }

    #[test]
    fn no_formats_requested_uses_config_default() {
        let options = PictureOptions {
            size: Some("300".to_string()),
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap();
        assert_eq!(plan.sources[0].mime_type, "image/webp");
    }

    // =========================================================================
    // Alt and img attributes
    // =========================================================================

    #[test]
    fn alt_prefers_caller_over_asset_metadata() {
        let options = PictureOptions {
            alt: Some("Caller alt".to_string()),
            ..Default::default()
        };
        let alt = resolve_alt(&config(), &options, &fixture_store().find("hero").unwrap());
        assert_eq!(alt.as_deref(), Some("Caller alt"));
    }

    #[test]
    fn alt_falls_back_to_asset_metadata() {
        let alt = resolve_alt(
            &config(),
            &PictureOptions::default(),
            &fixture_store().find("hero").unwrap(),
        );
        assert_eq!(alt.as_deref(), Some("A sweeping valley"));
    }

    #[test]
    fn alt_is_none_when_nothing_is_available() {
        let alt = resolve_alt(&config(), &PictureOptions::default(), &jpeg_asset());
        assert_eq!(alt, None);
    }

    #[test]
    fn alt_strips_markup() {
        let options = PictureOptions {
            alt: Some("A <em>very</em> nice view".to_string()),
            ..Default::default()
        };
        let alt = resolve_alt(&config(), &options, &jpeg_asset());
        assert_eq!(alt.as_deref(), Some("A very nice view"));
    }

    #[test]
    fn alt_fullstop_appends_period_when_configured() {
        let mut config = config();
        config.alt_fullstop = true;
        let options = PictureOptions {
            alt: Some("A view".to_string()),
            ..Default::default()
        };
        let alt = resolve_alt(&config, &options, &jpeg_asset());
        assert_eq!(alt.as_deref(), Some("A view."));

        // existing end punctuation is left alone
        let options = PictureOptions {
            alt: Some("A view!".to_string()),
            ..Default::default()
        };
        let alt = resolve_alt(&config, &options, &jpeg_asset());
        assert_eq!(alt.as_deref(), Some("A view!"));
    }

    #[test]
    fn alt_fullstop_never_turns_empty_alt_into_a_period() {
        let mut config = config();
        config.alt_fullstop = true;
        let options = PictureOptions {
            alt: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_alt(&config, &options, &jpeg_asset()), None);
    }

    #[test]
    fn lazy_option_overrides_config_default() {
        let options = PictureOptions {
            size: Some("300".to_string()),
            lazy: Some(false),
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap();
        assert_eq!(plan.img.loading, None);
    }

    #[test]
    fn css_class_is_trimmed_and_dropped_when_empty() {
        let options = PictureOptions {
            size: Some("300".to_string()),
            css_class: Some("  hero-img  ".to_string()),
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap();
        assert_eq!(plan.img.css_class.as_deref(), Some("hero-img"));

        let options = PictureOptions {
            size: Some("300".to_string()),
            css_class: Some("   ".to_string()),
            ..Default::default()
        };
        let plan = compile(&config(), &fixture_store(), &EchoService, "hero", &options).unwrap();
        assert_eq!(plan.img.css_class, None);
    }

    #[test]
    fn strip_tags_handles_plain_and_nested_text() {
        assert_eq!(strip_tags("no tags"), "no tags");
        assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
        assert_eq!(strip_tags("a < b"), "a ");
    }
}
