//! Srcset expansion.
//!
//! Expands one parsed descriptor into the concrete srcset string for a
//! `<source>`. Two mutually exclusive modes, selected by whether the
//! descriptor carries a `sizes` attribute:
//!
//! - **sizes mode**: each size is scaled by every configured size
//!   multiplier and emitted as a `<url> <width>w` candidate. The browser
//!   picks by layout width.
//! - **DPR mode**: each size is scaled by every configured device pixel
//!   ratio and emitted as a `<url> <dpr>x` candidate. The browser picks
//!   by screen density.
//!
//! Scaled candidates that collide on width are dropped after the first
//! occurrence (width-auto candidates collide on height instead) — a
//! srcset offering the same pixel width twice is wasted bytes and makes
//! the browser's choice ambiguous. Every resize request forces
//! `fit=crop_focal` and the entry's format.

use crate::asset::AssetRecord;
use crate::config::PictureConfig;
use crate::descriptor::SizeDescriptor;
use crate::url::{Fit, ImageService, ResizeParams};
use std::collections::HashSet;

/// Dedup identity of a scaled candidate.
#[derive(Hash, PartialEq, Eq)]
enum CandidateKey {
    Width(u32),
    /// Only for width-auto candidates (DPR mode, height-driven sizing).
    Height(u32),
}

/// Expand a descriptor into its srcset attribute value.
///
/// Never returns an empty string for a descriptor with at least one size
/// (config validation guarantees non-empty multiplier and DPR lists).
pub fn expand_srcset(
    config: &PictureConfig,
    service: &dyn ImageService,
    asset: &AssetRecord,
    descriptor: &SizeDescriptor,
    format: &str,
) -> String {
    let sizes_mode = descriptor.sizes.is_some();
    let factors: &[f64] = if sizes_mode {
        &config.size_multipliers
    } else {
        &config.dpr
    };

    let mut seen: HashSet<CandidateKey> = HashSet::new();
    let mut tokens: Vec<String> = Vec::new();

    for variant in &descriptor.variants {
        for &factor in factors {
            let width = variant.width.as_px().map(|w| scale(w, factor));
            let height = variant.height.as_px().map(|h| scale(h, factor));

            let key = match (width, height) {
                (Some(w), _) => CandidateKey::Width(w),
                (None, Some(h)) => CandidateKey::Height(h),
                // unreachable: the parser rejects double-auto sizes
                (None, None) => continue,
            };
            if !seen.insert(key) {
                continue;
            }

            let url = service.image_url(
                asset,
                &ResizeParams {
                    width,
                    height,
                    format: Some(format.to_string()),
                    fit: Some(Fit::CropFocal),
                },
            );

            if sizes_mode {
                // sizes mode guarantees a numeric width (parser invariant)
                let w = width.unwrap_or(0);
                tokens.push(format!("{url} {w}w"));
            } else {
                tokens.push(format!("{url} {}x", format_factor(factor)));
            }
        }
    }

    tokens.join(",")
}

fn scale(value: f64, factor: f64) -> u32 {
    (value * factor).round() as u32
}

/// `1.0` → `"1"`, `1.5` → `"1.5"` — srcset density descriptors.
fn format_factor(factor: f64) -> String {
    if factor.fract() == 0.0 {
        format!("{}", factor as u64)
    } else {
        format!("{factor}")
    }
}
