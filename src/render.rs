//! `<picture>` rendering.
//!
//! A [`RenderPlan`] is the fully resolved output description: ordered
//! `<source>` entries plus the fallback `<img>`. Rendering it is a pure
//! formatting step with two targets:
//!
//! - HTML via [maud](https://maud.lambda.xyz/) — compile-time checked
//!   markup with automatic escaping.
//! - JSON via `serde_json` — the same logical structure with field names
//!   matching the HTML attribute names, so the two outputs are
//!   structurally equivalent by construction.

use maud::html;
use serde::{Deserialize, Serialize};

/// One `<source>` element of the plan.
///
/// Plan order is semantically significant: browsers take the first
/// `<source>` whose media condition matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Mime type of the variants, e.g. `image/webp`.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Media condition, e.g. `(min-width: 768px)`. Absent on the
    /// always-matching fallback source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Comma-joined srcset candidates.
    pub srcset: String,
    /// Verbatim `sizes` attribute, when the descriptor carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
}

/// The fallback `<img>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImgEntry {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    /// `Some("lazy")` when lazy loading is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<String>,
    /// Intrinsic width, emitted only when the asset dimensions are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Complete output description for one picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub sources: Vec<SourceEntry>,
    pub img: ImgEntry,
    /// Class for the wrapping `<picture>` element.
    #[serde(
        rename = "wrapperClass",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub wrapper_class: Option<String>,
}

/// Render the plan as a `<picture>` HTML string.
pub fn to_html(plan: &RenderPlan) -> String {
    html! {
        picture class=[plan.wrapper_class.as_deref()] {
            @for entry in &plan.sources {
                source type=(entry.mime_type)
                    media=[entry.media.as_deref()]
                    srcset=(entry.srcset)
                    sizes=[entry.sizes.as_deref()];
            }
            img src=(plan.img.src)
                alt=[plan.img.alt.as_deref()]
                class=[plan.img.css_class.as_deref()]
                loading=[plan.img.loading.as_deref()]
                width=[plan.img.width]
                height=[plan.img.height];
        }
    }
    .into_string()
}

/// Render the plan as its JSON encoding.
pub fn to_json(plan: &RenderPlan) -> Result<String, serde_json::Error> {
    serde_json::to_string(plan)
}
