//! Extension-swap rules: materialize a missing `.jpg` from a same-stem sibling.
//!
//! A missing `X.jpg` is converted from `X.gif` (or `X.png`). For
//! `cover.jpg` the sibling stem is `1`, so `1.png` first becomes `1.jpg`,
//! and `1.jpg` is then scaled to the cover width as `cover.jpg`.

use super::cover::{COVER_FILE, COVER_STEM};
use super::{DerivationOptions, DerivationOutcome, codec};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Sibling formats converted to JPEG, highest precedence first.
pub const SIBLING_EXTENSIONS: &[&str] = &["gif", "png"];

/// Stem of the first image in a directory.
const FIRST_IMAGE_STEM: &str = "1";

/// The `.jpg` a request converts a sibling into: `X.jpg` itself, or `1.jpg`
/// for `cover.jpg`.
pub fn conversion_target(requested: &Path) -> Option<PathBuf> {
    let dir = requested.parent()?;
    let stem = requested.file_stem()?.to_str()?;
    let lookup_stem = if stem == COVER_STEM {
        FIRST_IMAGE_STEM
    } else {
        stem
    };
    Some(dir.join(format!("{}.jpg", lookup_stem)))
}

/// Apply the extension-swap rules to a missing `requested` `.jpg` path.
///
/// The caller holds the locks of `requested` and of its conversion target.
pub fn derive(requested: &Path, options: &DerivationOptions) -> DerivationOutcome {
    let (Some(dir), Some(converted)) = (requested.parent(), conversion_target(requested)) else {
        return DerivationOutcome::Unavailable;
    };
    let Some(lookup_stem) = converted
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
    else {
        return DerivationOutcome::Unavailable;
    };

    let mut outcome = DerivationOutcome::Unavailable;

    if converted.is_file() {
        outcome = DerivationOutcome::Derived(converted);
    } else if let Some(source) = SIBLING_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", lookup_stem, ext)))
        .find(|path| path.is_file())
    {
        outcome = match convert(&source, &converted, options) {
            Ok(()) => {
                tracing::info!(
                    source = %source.display(),
                    target = %converted.display(),
                    "Converted sibling to JPEG"
                );
                DerivationOutcome::Derived(converted)
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.display(),
                    error = %e,
                    "Conversion failed, serving source"
                );
                DerivationOutcome::Fallback(source)
            }
        };
    }

    let is_cover = requested
        .file_name()
        .is_some_and(|name| name == COVER_FILE);
    if !is_cover {
        return outcome;
    }

    let first = dir.join(format!("{}.jpg", FIRST_IMAGE_STEM));
    if !first.is_file() {
        return outcome;
    }

    match scale_to_cover(&first, requested, options) {
        Ok(()) => {
            tracing::info!(
                source = %first.display(),
                target = %requested.display(),
                "Generated cover"
            );
            DerivationOutcome::Derived(requested.to_path_buf())
        }
        Err(e) => {
            tracing::warn!(
                source = %first.display(),
                error = %e,
                "Cover generation failed, serving source"
            );
            DerivationOutcome::Fallback(first)
        }
    }
}

fn convert(source: &Path, target: &Path, options: &DerivationOptions) -> Result<()> {
    let img = codec::decode(source)?;
    codec::save_jpeg(&img, target, options.jpeg_quality)
}

/// Scale to exactly the cover width, up or down.
fn scale_to_cover(source: &Path, target: &Path, options: &DerivationOptions) -> Result<()> {
    let img = codec::decode(source)?;
    let img = codec::resize_to_width(&img, options.cover_width);
    codec::save_jpeg(&img, target, options.jpeg_quality)
}
