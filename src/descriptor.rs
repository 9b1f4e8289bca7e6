//! Size-descriptor mini-language parser.
//!
//! A descriptor is a compact pipe-delimited string encoding everything a
//! `<source>` needs: one or more candidate sizes, an optional aspect
//! ratio, and an optional `sizes` attribute:
//!
//! ```text
//! descriptor := sizes ["|" ratio ["|" sizes-attribute]]
//! sizes      := size ("," size)*
//! size       := dimension | dimension "x" dimension
//! dimension  := number | "auto"
//! ratio      := "auto" | "W:H" | "W/H" | number   (number is h/w directly)
//! ```
//!
//! Examples:
//! - `"300"` — one 300px-wide size, height left to the image service
//! - `"300,600x200"` — two sizes, the second with an explicit height
//! - `"300|16:9"` — 300px wide, height derived from the 16:9 ratio
//! - `"300,600|1.5|100vw"` — two sizes, h/w multiplier 1.5, and a
//!   `sizes="100vw"` attribute
//!
//! Parsing is total and deterministic: malformed input always fails with
//! [`DescriptorError`], never a silently dropped token.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid size descriptor {input:?}: {reason}")]
pub struct DescriptorError {
    /// The full descriptor string that failed to parse.
    pub input: String,
    /// What was wrong with it.
    pub reason: String,
}

impl DescriptorError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which explicit `WxH` dimension counts as the width.
///
/// `portrait` swaps the two dimensions of explicit `WxH` tokens at parse
/// time only; single-dimension tokens and all later multiplier/DPR
/// scaling operate on the post-swap values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// Parse an `orientation`/`ori` option value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "landscape" => Some(Self::Landscape),
            "portrait" => Some(Self::Portrait),
            _ => None,
        }
    }
}

/// One dimension of a size: a pixel value or "let the service decide".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Preserve the source aspect ratio for this axis.
    Auto,
    Px(f64),
}

impl Dimension {
    pub fn as_px(&self) -> Option<f64> {
        match self {
            Dimension::Auto => None,
            Dimension::Px(v) => Some(*v),
        }
    }
}

/// One candidate size: the unscaled basis for srcset expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeVariant {
    pub width: Dimension,
    pub height: Dimension,
}

/// Aspect ratio applied to sizes that carry no explicit height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    /// No ratio: missing dimensions stay auto.
    Auto,
    /// Height as a multiple of width (h/w).
    OverWidth(f64),
}

/// Parsed result of one descriptor string.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeDescriptor {
    /// Candidate sizes, in descriptor order. Never empty.
    pub variants: Vec<SizeVariant>,
    /// Raw `sizes` attribute, passed through verbatim when present.
    pub sizes: Option<String>,
    /// The h/w ratio that was applied to heightless sizes.
    pub ratio: Ratio,
}

/// Parse a descriptor string into a [`SizeDescriptor`].
///
/// `parse("300,600x200|1.5|100vw")` yields variants `[300x450, 600x200]`
/// and `sizes = Some("100vw")`. A descriptor without `|` parts has no
/// `sizes` attribute and leaves unspecified heights auto.
pub fn parse(descriptor: &str, orientation: Orientation) -> Result<SizeDescriptor, DescriptorError> {
    let mut parts = descriptor.splitn(3, '|');
    // splitn always yields at least one part, possibly empty
    let size_part = parts.next().unwrap_or("");
    let ratio_part = parts.next();
    let sizes_part = parts.next();

    let ratio = match ratio_part {
        Some(r) => calc_ratio(r).map_err(|reason| DescriptorError::new(descriptor, reason))?,
        None => Ratio::Auto,
    };

    let variants = parse_size_data(size_part, ratio, orientation)
        .map_err(|reason| DescriptorError::new(descriptor, reason))?;

    let sizes = sizes_part
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    // A `<width>w` srcset token cannot be produced without a width
    if sizes.is_some() && variants.iter().any(|v| v.width == Dimension::Auto) {
        return Err(DescriptorError::new(
            descriptor,
            "width cannot be 'auto' when a sizes attribute is present",
        ));
    }

    Ok(SizeDescriptor {
        variants,
        sizes,
        ratio,
    })
}

/// Compute the h/w ratio from a ratio spec.
///
/// - `"auto"` or empty → [`Ratio::Auto`]
/// - `"16:9"` or `"16/9"` → `9/16`
/// - `"1.5"` → `1.5` (already h/w)
pub fn calc_ratio(spec: &str) -> Result<Ratio, String> {
    let spec = spec.trim();

    if spec == "auto" || spec.is_empty() {
        return Ok(Ratio::Auto);
    }

    let parts: Option<(&str, &str)> = spec
        .split_once(':')
        .or_else(|| spec.split_once('/'));

    match parts {
        Some((w, h)) => {
            let w = parse_number(w).ok_or_else(|| format!("bad ratio width {w:?}"))?;
            let h = parse_number(h).ok_or_else(|| format!("bad ratio height {h:?}"))?;
            if w <= 0.0 || h <= 0.0 {
                return Err(format!("ratio values must be positive, got {spec:?}"));
            }
            Ok(Ratio::OverWidth(h / w))
        }
        None => {
            let r = parse_number(spec).ok_or_else(|| format!("bad ratio {spec:?}"))?;
            if r <= 0.0 {
                return Err(format!("ratio must be positive, got {spec:?}"));
            }
            Ok(Ratio::OverWidth(r))
        }
    }
}

/// Split the size part on `,` and parse each size token.
fn parse_size_data(
    size_data: &str,
    ratio: Ratio,
    orientation: Orientation,
) -> Result<Vec<SizeVariant>, String> {
    if size_data.trim().is_empty() {
        return Err("descriptor has an empty size list".to_string());
    }

    size_data
        .split(',')
        .map(|token| parse_single_size(token, ratio, orientation))
        .collect()
}

/// Parse one size token: `"300"`, `"600x200"`, `"300xauto"`.
fn parse_single_size(
    token: &str,
    ratio: Ratio,
    orientation: Orientation,
) -> Result<SizeVariant, String> {
    let token = token.trim();
    if token.is_empty() {
        return Err("empty size token".to_string());
    }

    if let Some((first, second)) = token.split_once('x') {
        if second.contains('x') {
            return Err(format!("size {token:?} has more than two dimensions"));
        }
        let first = parse_dimension(first)?;
        let second = parse_dimension(second)?;
        let (width, height) = match orientation {
            Orientation::Landscape => (first, second),
            Orientation::Portrait => (second, first),
        };
        if width == Dimension::Auto && height == Dimension::Auto {
            return Err(format!("size {token:?} has no fixed dimension"));
        }
        return Ok(SizeVariant { width, height });
    }

    // Single dimension: width, with height derived from the ratio
    let width = parse_dimension(token)?;
    let Some(w) = width.as_px() else {
        return Err(format!("size {token:?} has no fixed dimension"));
    };
    let height = match ratio {
        Ratio::Auto => Dimension::Auto,
        Ratio::OverWidth(r) => Dimension::Px(w * r),
    };
    Ok(SizeVariant { width, height })
}

fn parse_dimension(s: &str) -> Result<Dimension, String> {
    let s = s.trim();
    if s == "auto" {
        return Ok(Dimension::Auto);
    }
    match parse_number(s) {
        Some(v) if v > 0.0 => Ok(Dimension::Px(v)),
        Some(_) => Err(format!("dimension {s:?} must be positive")),
        None => Err(format!("bad dimension {s:?}")),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let v: f64 = s.trim().parse().ok()?;
    v.is_finite().then_some(v)
}
