//! Picture configuration module.
//!
//! Handles loading and validating `config.toml`. Configuration is loaded
//! once per process and shared read-only across all render calls — every
//! component receives a `&PictureConfig` explicitly instead of reaching
//! into process-global state.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! min_width = 300            # Fallback <img> width in pixels
//! default_filetype = "webp"  # Output format when none is requested
//! supported_filetypes = ["jpg", "jpeg", "png", "webp"]
//! size_multipliers = [1.0, 1.5, 2.0]  # Variants per size when `sizes` is set
//! dpr = [1.0, 2.0]           # Device pixel ratios when `sizes` is not set
//! lazy_loading = true        # Emit loading="lazy" by default
//! alt_fullstop = false       # Append a trailing period to alt text
//!
//! [breakpoints]              # Named min-width thresholds; "default" required
//! default = 0
//! sm = 640
//! md = 768
//! lg = 1024
//! xl = 1280
//! "2xl" = 1536
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only override the fallback width
//! min_width = 400
//! ```
//!
//! Unknown keys are rejected to catch typos early. Note that a
//! `[breakpoints]` table replaces the default set wholesale (it is a
//! single value, not a merge), so it must still contain `default = 0`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Picture generation settings loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictureConfig {
    /// Named viewport-width thresholds (px) for `(min-width: …)` media
    /// conditions. Must contain a `default` entry valued 0, which denotes
    /// the no-media-query fallback `<source>`.
    pub breakpoints: BTreeMap<String, u32>,
    /// Multipliers applied to each requested size when a `sizes` attribute
    /// is present, producing `<width>w` srcset candidates.
    pub size_multipliers: Vec<f64>,
    /// Device pixel ratios used when no `sizes` attribute is present,
    /// producing `<dpr>x` srcset candidates.
    pub dpr: Vec<f64>,
    /// File types (mime subtypes) the image service can process. Assets
    /// outside this set are emitted verbatim, without variants.
    pub supported_filetypes: Vec<String>,
    /// Output format used when the caller requests none.
    pub default_filetype: String,
    /// Width of the fallback `<img src>` request. Acts as the floor for
    /// the single non-responsive variant every picture carries.
    pub min_width: u32,
    /// Whether `loading="lazy"` is emitted when the caller doesn't say.
    pub lazy_loading: bool,
    /// Append a trailing period to non-empty alt text that lacks one.
    pub alt_fullstop: bool,
}

fn default_breakpoints() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("default".to_string(), 0),
        ("sm".to_string(), 640),
        ("md".to_string(), 768),
        ("lg".to_string(), 1024),
        ("xl".to_string(), 1280),
        ("2xl".to_string(), 1536),
    ])
}

impl Default for PictureConfig {
    fn default() -> Self {
        Self {
            breakpoints: default_breakpoints(),
            size_multipliers: vec![1.0, 1.5, 2.0],
            dpr: vec![1.0, 2.0],
            supported_filetypes: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
            default_filetype: "webp".to_string(),
            min_width: 300,
            lazy_loading: true,
            alt_fullstop: false,
        }
    }
}

impl PictureConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.breakpoints.get("default") {
            None => {
                return Err(ConfigError::Validation(
                    "breakpoints must contain a 'default' entry".into(),
                ));
            }
            Some(&px) if px != 0 => {
                return Err(ConfigError::Validation(
                    "breakpoints.default must be 0".into(),
                ));
            }
            Some(_) => {}
        }
        if self.size_multipliers.is_empty() {
            return Err(ConfigError::Validation(
                "size_multipliers must not be empty".into(),
            ));
        }
        if self.size_multipliers.iter().any(|&m| m <= 0.0) {
            return Err(ConfigError::Validation(
                "size_multipliers values must be positive".into(),
            ));
        }
        if self.dpr.is_empty() {
            return Err(ConfigError::Validation("dpr must not be empty".into()));
        }
        if self.dpr.iter().any(|&d| d <= 0.0) {
            return Err(ConfigError::Validation(
                "dpr values must be positive".into(),
            ));
        }
        if self.supported_filetypes.is_empty() {
            return Err(ConfigError::Validation(
                "supported_filetypes must not be empty".into(),
            ));
        }
        if !self
            .supported_filetypes
            .iter()
            .any(|f| f == &self.default_filetype)
        {
            return Err(ConfigError::Validation(format!(
                "default_filetype '{}' must be listed in supported_filetypes",
                self.default_filetype
            )));
        }
        if self.min_width == 0 {
            return Err(ConfigError::Validation("min_width must be >= 1".into()));
        }
        Ok(())
    }

    /// Whether a mime subtype (e.g. `jpeg` from `image/jpeg`) can be
    /// handed to the image service.
    pub fn supports_filetype(&self, subtype: &str) -> bool {
        let subtype = subtype.to_ascii_lowercase();
        self.supported_filetypes.iter().any(|f| *f == subtype)
    }
}

/// Load config from a `config.toml` file, validated.
///
/// Returns the stock defaults when the file doesn't exist.
pub fn load_config(path: &Path) -> Result<PictureConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        PictureConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Generate a fully documented default `config.toml` for `gen-config`.
pub fn documented_default() -> String {
    let defaults = PictureConfig::default();
    format!(
        r#"# picturesque configuration
# All options are optional; the values below are the stock defaults.

# Width of the fallback <img src> request in pixels.
min_width = {min_width}

# Output format used when a render call requests none.
default_filetype = "{default_filetype}"

# File types the image service can process. Assets outside this set are
# emitted verbatim (direct URL, no <source> variants).
supported_filetypes = [{filetypes}]

# Multipliers applied per requested size when a `sizes` attribute is
# present (each produces one `<width>w` srcset candidate).
size_multipliers = [{multipliers}]

# Device pixel ratios used when no `sizes` attribute is present (each
# produces one `<dpr>x` srcset candidate).
dpr = [{dpr}]

# Emit loading="lazy" on the fallback <img> unless overridden per call.
lazy_loading = {lazy}

# Append a trailing period to non-empty alt text that lacks end
# punctuation.
alt_fullstop = {fullstop}

# Named min-width thresholds for breakpoint-based sources. This table
# replaces the default set wholesale and must keep `default = 0`.
[breakpoints]
{breakpoints}
"#,
        min_width = defaults.min_width,
        default_filetype = defaults.default_filetype,
        filetypes = defaults
            .supported_filetypes
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect::<Vec<_>>()
            .join(", "),
        multipliers = defaults
            .size_multipliers
            .iter()
            .map(|m| format!("{m:?}"))
            .collect::<Vec<_>>()
            .join(", "),
        dpr = defaults
            .dpr
            .iter()
            .map(|d| format!("{d:?}"))
            .collect::<Vec<_>>()
            .join(", "),
        lazy = defaults.lazy_loading,
        fullstop = defaults.alt_fullstop,
        breakpoints = {
            // Sorted by threshold so the generated file reads smallest-first
            let mut entries: Vec<_> = defaults.breakpoints.iter().collect();
            entries.sort_by_key(|&(_, &px)| px);
            entries
                .iter()
                .map(|(name, px)| {
                    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        format!("{name} = {px}")
                    } else {
                        format!("\"{name}\" = {px}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}
