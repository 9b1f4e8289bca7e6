//! Breakpoint plan construction.
//!
//! Turns the caller's per-breakpoint descriptor strings into an ordered
//! list of [`BreakpointEntry`] values, one per `(breakpoint, format)`
//! pair. Ordering is the load-bearing part: browsers evaluate `<source>`
//! elements top to bottom and take the first whose media condition
//! matches, so entries are sorted by pixel threshold descending (largest
//! `min-width` first), with ties broken by the order formats were
//! requested. `default` entries carry no media condition and always come
//! last — the always-matching fallback `<source>`.

use crate::config::PictureConfig;
use crate::descriptor::{self, DescriptorError, Orientation, SizeDescriptor};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    InvalidDescriptor(#[from] DescriptorError),
    #[error("unknown breakpoint: {0}")]
    UnknownBreakpoint(String),
}

/// One planned `<source>`: a breakpoint/format pair with its parsed
/// descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointEntry {
    /// Breakpoint name (`"default"` for the no-media-query fallback).
    pub breakpoint: String,
    /// `min-width` threshold in pixels; 0 for `default`.
    pub threshold: u32,
    /// Parsed size descriptor for this breakpoint.
    pub descriptor: SizeDescriptor,
    /// Output format (mime subtype, e.g. `webp`).
    pub format: String,
}

impl BreakpointEntry {
    /// The media condition for this entry, `None` for `default`.
    pub fn media_condition(&self) -> Option<String> {
        (self.threshold > 0).then(|| format!("(min-width: {}px)", self.threshold))
    }
}

/// Build the ordered variant plan.
///
/// `requested` holds `(breakpoint name, descriptor string)` pairs; the
/// literal name `default` is always legal and is routed to the fallback
/// tail together with `default_size`. Any other name missing from
/// `config.breakpoints` is a [`PlanError::UnknownBreakpoint`]. Every
/// descriptor must parse, or the whole plan fails — a partial `<picture>`
/// with a broken srcset is worse than no picture.
pub fn build_plan(
    config: &PictureConfig,
    requested: &[(String, String)],
    formats: &[String],
    default_size: Option<&str>,
    orientation: Orientation,
) -> Result<Vec<BreakpointEntry>, PlanError> {
    // (threshold, descriptor) per requested breakpoint, defaults split off
    let mut cascade: Vec<(String, u32, SizeDescriptor)> = Vec::new();
    let mut defaults: Vec<SizeDescriptor> = Vec::new();

    for (name, descriptor_string) in requested {
        let parsed = descriptor::parse(descriptor_string, orientation)?;
        if name == "default" {
            defaults.push(parsed);
            continue;
        }
        let Some(&threshold) = config.breakpoints.get(name) else {
            return Err(PlanError::UnknownBreakpoint(name.clone()));
        };
        cascade.push((name.clone(), threshold, parsed));
    }

    if let Some(size) = default_size {
        defaults.push(descriptor::parse(size, orientation)?);
    }

    // Largest min-width first; stable, so equal thresholds keep request order
    cascade.sort_by(|a, b| b.1.cmp(&a.1));

    let mut entries = Vec::with_capacity((cascade.len() + defaults.len()) * formats.len());
    for (name, threshold, parsed) in &cascade {
        for format in formats {
            entries.push(BreakpointEntry {
                breakpoint: name.clone(),
                threshold: *threshold,
                descriptor: parsed.clone(),
                format: format.clone(),
            });
        }
    }
    for parsed in &defaults {
        for format in formats {
            entries.push(BreakpointEntry {
                breakpoint: "default".to_string(),
                threshold: 0,
                descriptor: parsed.clone(),
                format: format.clone(),
            });
        }
    }

    Ok(entries)
}
